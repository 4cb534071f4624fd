/**
 * Real-time Event Broadcasting
 *
 * This module provides the pub/sub side of the realtime system: the
 * [`Publisher`] trait the message handlers publish through, and
 * [`ChannelHub`], the in-process implementation that keeps one
 * `tokio::sync::broadcast` channel per named channel.
 *
 * # Channels
 *
 * Channels are created lazily on first publish or subscribe. Publishing to a
 * channel nobody listens to succeeds and reaches zero subscribers, the same
 * as a hosted broker. Channels whose last receiver went away are pruned by
 * [`ChannelHub::cleanup_inactive_channels`].
 *
 * # Limits
 *
 * Channel names and payload sizes are checked against the limits hosted
 * brokers enforce, so a deployment that later swaps in a remote broker sees
 * the same failures.
 */

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Per-channel buffer; slower subscribers skip ahead when they fall behind
pub const CHANNEL_CAPACITY: usize = 256;

/// Longest accepted channel name
pub const MAX_CHANNEL_NAME_LEN: usize = 164;

/// Largest accepted serialized payload, in bytes
pub const MAX_PAYLOAD_BYTES: usize = 10_240;

/// Errors returned by a [`Publisher`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("Invalid channel name '{channel}'")]
    InvalidChannel { channel: String },

    #[error("Payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Broker-side failure
    #[error("Publish failed: {message}")]
    Unavailable { message: String },
}

impl PublishError {
    /// Only broker-side failures can succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Publishes events to named pub/sub channels
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        channel: &str,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), PublishError>;
}

/// An event as delivered to channel subscribers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealtimeEvent {
    pub channel: String,
    pub event: String,
    pub data: serde_json::Value,
}

/// In-process pub/sub hub, one broadcast channel per channel name
///
/// Cloning is cheap; all clones share the same channels.
#[derive(Clone, Default)]
pub struct ChannelHub {
    channels: Arc<DashMap<String, broadcast::Sender<RealtimeEvent>>>,
}

impl ChannelHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a channel, creating it if needed
    pub fn subscribe(&self, channel: &str) -> broadcast::Receiver<RealtimeEvent> {
        self.sender(channel).subscribe()
    }

    fn sender(&self, channel: &str) -> broadcast::Sender<RealtimeEvent> {
        self.channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Drop channels that no longer have any receivers
    pub fn cleanup_inactive_channels(&self) {
        self.channels.retain(|_, sender| sender.receiver_count() > 0);
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .get(channel)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[async_trait]
impl Publisher for ChannelHub {
    async fn publish(
        &self,
        channel: &str,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), PublishError> {
        validate_channel_name(channel)?;

        let size = serde_json::to_vec(&payload)
            .map_err(|e| PublishError::Serialization {
                message: e.to_string(),
            })?
            .len();
        if size > MAX_PAYLOAD_BYTES {
            return Err(PublishError::PayloadTooLarge {
                size,
                limit: MAX_PAYLOAD_BYTES,
            });
        }

        let realtime_event = RealtimeEvent {
            channel: channel.to_string(),
            event: event.to_string(),
            data: payload,
        };

        match self.sender(channel).send(realtime_event) {
            Ok(subscriber_count) => {
                tracing::info!(
                    "[Realtime] {} on {} delivered to {} subscribers",
                    event,
                    channel,
                    subscriber_count
                );
            }
            Err(_) => {
                tracing::debug!("[Realtime] No subscribers on {} for {}", channel, event);
            }
        }
        Ok(())
    }
}

/// Check a channel name against the broker naming rules
pub fn validate_channel_name(channel: &str) -> Result<(), PublishError> {
    let valid_chars = channel
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_-=@,.;".contains(c));

    if channel.is_empty() || channel.len() > MAX_CHANNEL_NAME_LEN || !valid_chars {
        return Err(PublishError::InvalidChannel {
            channel: channel.to_string(),
        });
    }
    Ok(())
}

/// Turn a logical `a:b:c` name into a broker-safe channel name (`a__b__c`)
pub fn to_channel_key(name: &str) -> String {
    name.replace(':', "__")
}

/// Channel carrying every message of one conversation
pub fn chat_channel(chat_id: &str) -> String {
    to_channel_key(&format!("chat:{}", chat_id))
}

/// Channel carrying new-message notifications for a user's chat list
pub fn user_chats_channel(user_id: &str) -> String {
    to_channel_key(&format!("user:{}:chats", user_id))
}
