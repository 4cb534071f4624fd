//! Shared Error Types
//!
//! This module defines the errors raised by the shared data types: message
//! validation, chat identifier parsing and payload (de)serialization.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - A message or request field failed validation
//! - `ChatIdError` - A chat identifier could not be decoded
//!
//! # Usage
//!
//! ```rust
//! use xfchat::shared::error::SharedError;
//!
//! let error = SharedError::validation("text", "Message text cannot be empty");
//! assert!(error.to_string().contains("text"));
//! ```
use thiserror::Error;

/// Errors produced by the shared message and chat types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Chat identifier that does not decode into two participants
    #[error("Invalid chat id '{chat_id}'")]
    ChatIdError {
        /// The rejected identifier
        chat_id: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new chat id error
    pub fn chat_id(chat_id: impl Into<String>) -> Self {
        Self::ChatIdError {
            chat_id: chat_id.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
