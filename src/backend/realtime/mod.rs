//! Real-time Update Module
//!
//! Pub/sub fan-out for chat messages. The message handlers publish through
//! the [`Publisher`] trait; the shipped implementation is [`ChannelHub`], an
//! in-process set of named broadcast channels that clients read through a
//! Server-Sent Events endpoint.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── broadcast.rs    - Publisher trait, ChannelHub, channel naming
//! └── subscription.rs - SSE subscription handler
//! ```
//!
//! # Channels
//!
//! - `chat__{chatId}` - event `incoming-message`, every message of a
//!   conversation
//! - `user__{id}__chats` - event `new_message`, messages addressed to the
//!   user, enriched with the sender's name and image

/// Event broadcasting and channel naming
pub mod broadcast;

/// Server-Sent Events subscription handler
pub mod subscription;

pub use broadcast::{
    chat_channel, user_chats_channel, ChannelHub, PublishError, Publisher, RealtimeEvent,
    MAX_PAYLOAD_BYTES,
};
pub use subscription::subscribe_channel;
