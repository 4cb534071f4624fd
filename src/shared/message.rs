/**
 * Message Data Structures
 *
 * This module defines the message record appended to a conversation log,
 * the request body accepted by the send endpoint, the sender profile read
 * from the key-value store and the enriched notification pushed to the
 * counterparty's chat list.
 *
 * All wire types serialize in camelCase so stored log entries and realtime
 * payloads keep the field names clients already consume
 * (`senderId`, `chatId`, `senderImg`, ...).
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// A single chat message
///
/// Created once per accepted send request and never mutated afterwards.
/// The serialized form is the member stored in the per-chat ordered log.
///
/// # Example
/// ```rust
/// use xfchat::shared::Message;
///
/// let message = Message::new("m1", "u1", "hi", 1_700_000_000_000);
/// assert!(message.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Opaque unique message id
    pub id: String,
    /// Id of the user who sent the message
    pub sender_id: String,
    /// Message text
    pub text: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Message {
    /// Create a message record from its parts
    pub fn new(
        id: impl Into<String>,
        sender_id: impl Into<String>,
        text: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id: id.into(),
            sender_id: sender_id.into(),
            text: text.into(),
            timestamp,
        }
    }

    /// Check the record against the message schema
    ///
    /// Every string field must be non-empty and the timestamp positive.
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.id.is_empty() {
            return Err(SharedError::validation("id", "must not be empty"));
        }
        if self.sender_id.is_empty() {
            return Err(SharedError::validation("senderId", "must not be empty"));
        }
        if self.text.is_empty() {
            return Err(SharedError::validation("text", "must not be empty"));
        }
        if self.timestamp <= 0 {
            return Err(SharedError::validation("timestamp", "must be positive"));
        }
        Ok(())
    }

    /// Serialize to the JSON form stored in the ordered log
    pub fn to_log_member(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a member read back from the ordered log
    pub fn from_log_member(member: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(member)?)
    }
}

/// Body of `POST /api/message/send`
///
/// Both fields are optional at the parsing stage so that an absent field
/// and an empty one are reported the same way by [`Self::into_parts`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub text: Option<String>,
    pub chat_id: Option<String>,
}

impl SendMessageRequest {
    /// Split into `(text, chat_id)`, or `None` when either is missing or empty
    pub fn into_parts(self) -> Option<(String, String)> {
        match (self.text, self.chat_id) {
            (Some(text), Some(chat_id)) if !text.is_empty() && !chat_id.is_empty() => {
                Some((text, chat_id))
            }
            _ => None,
        }
    }
}

/// Stored user profile, read from `user:{id}`
///
/// Account providers may leave any of these unset or `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SenderProfile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Payload of the `new_message` event on the counterparty's chat list channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageNotification {
    #[serde(flatten)]
    pub message: Message,
    pub sender_img: Option<String>,
    pub sender_name: Option<String>,
}

impl NewMessageNotification {
    pub fn new(message: Message, sender: &SenderProfile) -> Self {
        Self {
            message,
            sender_img: sender.image.clone(),
            sender_name: sender.name.clone(),
        }
    }
}
