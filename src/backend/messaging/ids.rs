//! Message id generation

use uuid::Uuid;

/// Produces opaque, collision-resistant message ids
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random UUID v4 in its 32-character simple form
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
