//! Chat Identifiers
//!
//! A one-to-one conversation is named by joining its two participant ids with
//! [`CHAT_ID_SEPARATOR`], e.g. `"u1--u2"`. The identifier is never stored as
//! an entity; it keys the message log and names the conversation channel.

use std::fmt;
use std::str::FromStr;

use crate::shared::error::SharedError;

/// Separator between the two participant ids
pub const CHAT_ID_SEPARATOR: &str = "--";

/// A decoded `"<idA>--<idB>"` chat identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatId {
    first: String,
    second: String,
}

impl ChatId {
    pub fn participants(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.first == user_id || self.second == user_id
    }

    /// The participant that is not `user_id`
    ///
    /// Returns `None` when `user_id` is not part of this chat. For a chat
    /// between a user and themselves the user is their own counterparty.
    pub fn counterparty(&self, user_id: &str) -> Option<&str> {
        if self.first == user_id {
            Some(&self.second)
        } else if self.second == user_id {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl FromStr for ChatId {
    type Err = SharedError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split(CHAT_ID_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(first), Some(second), None) if !first.is_empty() && !second.is_empty() => {
                Ok(Self {
                    first: first.to_string(),
                    second: second.to_string(),
                })
            }
            _ => Err(SharedError::chat_id(raw)),
        }
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.first, CHAT_ID_SEPARATOR, self.second)
    }
}
