//! Shared Module
//!
//! Types shared by the HTTP handlers, the stores and the realtime layer:
//! the message record and request bodies, chat identifiers and the errors
//! they raise. Everything here is plain data and serializes to the JSON
//! clients already consume.

/// Message data structures
pub mod message;

/// Chat identifier parsing
pub mod chat_id;

/// Shared error types
pub mod error;

pub use chat_id::{ChatId, CHAT_ID_SEPARATOR};
pub use error::SharedError;
pub use message::{Message, NewMessageNotification, SendMessageRequest, SenderProfile};
