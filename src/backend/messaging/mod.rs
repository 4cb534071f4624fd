//! Messaging Module
//!
//! This module handles message ingress: authorizing a sender, persisting the
//! message and fanning it out to the realtime channels.

pub mod handlers;
pub mod ids;
pub mod retry;
pub mod service;

pub use handlers::{get_messages, send_message, HistoryParams};
pub use ids::{IdGenerator, UuidGenerator};
pub use retry::{PendingPublish, PublishRetryQueue, RetryPolicy};
pub use service::{authorize_participant, MessagingService, INCOMING_MESSAGE_EVENT, NEW_MESSAGE_EVENT};
