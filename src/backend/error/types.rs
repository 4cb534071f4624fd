/**
 * Backend Error Types
 *
 * This module defines the error type returned by the HTTP handlers.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Raised by the handlers themselves with an explicit status code:
 * - Missing or malformed request body (400)
 * - Missing session, caller not a participant, not friends (401)
 * - Persistence failure, reported generically (500)
 *
 * ## Collaborator Errors
 *
 * Errors bubbling up from the stores or the shared types. They all map to
 * 500 and carry their own message. Publish failures never reach a handler:
 * they are retried or logged after the message is stored.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use axum::http::StatusCode;
/// use xfchat::backend::error::BackendError;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Missing request body");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Response body
        message: String,
    },

    /// Store failure
    #[error(transparent)]
    StoreError(#[from] StoreError),

    /// Validation or serialization failure in shared types
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// `400 Bad Request`
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    /// `401 Unauthorized`
    pub fn unauthorized() -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    /// `500` with a body that does not reveal which dependency failed
    pub fn processing() -> Self {
        Self::handler(StatusCode::INTERNAL_SERVER_ERROR, "Error processing message")
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - everything else - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::StoreError(_)
            | Self::SharedError(_)
            | Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The response body for this error
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::StoreError(err) => err.to_string(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }
}
