//! Store Module
//!
//! Storage collaborators used by the message handlers. The handlers only see
//! two traits, so the backing service can be swapped through configuration:
//!
//! - [`KeyValueStore`] - friend sets (`user:{id}:friends`) and user profiles
//!   (`user:{id}`)
//! - [`OrderedLog`] - per-conversation message log scored by timestamp
//!   (`chat:{chatId}:messages`)
//!
//! # Backends
//!
//! - **`memory`** - in-process maps, used for development and tests
//! - **`sqlite`** - `sqlx` SQLite pool, tables created on connect
//! - **`upstash`** - Upstash Redis REST API over `reqwest`
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs      - Traits, errors and key helpers
//! ├── memory.rs   - In-memory backend
//! ├── sqlite.rs   - SQLite backend
//! └── upstash.rs  - Upstash Redis REST backend
//! ```

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod sqlite;
pub mod upstash;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use upstash::UpstashStore;

/// Errors returned by store backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Transport failure talking to a remote store
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote store answered with an error or an unexpected shape
    #[error("Upstream error: {message}")]
    Upstream {
        /// Human-readable error message
        message: String,
    },
}

impl StoreError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }
}

/// Key-value and set operations
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// All members of the set at `key` (empty when the key is absent)
    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// The string value at `key`
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Add `member` to the set at `key`; `true` when it was not present
    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Overwrite the string value at `key`
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Append-only log ordered by a numeric score
///
/// Appending a member that is already present updates its score, which makes
/// a repeated append of the same serialized message a no-op.
#[async_trait]
pub trait OrderedLog: Send + Sync {
    async fn append(&self, key: &str, score: i64, member: &str) -> Result<(), StoreError>;

    /// Members with `min <= score <= max`, ordered by score then member
    async fn range_by_score(&self, key: &str, min: i64, max: i64)
        -> Result<Vec<String>, StoreError>;
}

/// Store keys shared by every backend
pub mod keys {
    /// Set of the user's friend ids
    pub fn friends(user_id: &str) -> String {
        format!("user:{}:friends", user_id)
    }

    /// JSON profile of the user
    pub fn user(user_id: &str) -> String {
        format!("user:{}", user_id)
    }

    /// Ordered message log of a conversation
    pub fn chat_messages(chat_id: &str) -> String {
        format!("chat:{}:messages", chat_id)
    }
}
