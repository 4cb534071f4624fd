//! Message Ingress Pipeline
//!
//! [`MessagingService`] holds the collaborators behind the message endpoints
//! and runs the send sequence once the handler has parsed the body and
//! resolved the caller:
//!
//! 1. decode the chat id and check the caller is a participant
//! 2. check the counterparty is in the caller's friend set
//! 3. load the caller's profile for the notification
//! 4. build and validate the message record, including the size of both
//!    event payloads
//! 5. append it to the conversation log
//! 6. publish to the conversation channel and the counterparty's chat list
//!
//! Every authorization check happens before the first write. The log append
//! is the commit point: once it succeeds the request succeeds, and publishes
//! that fail are retried in the background rather than surfaced.

use axum::http::StatusCode;
use serde_json::Value;
use std::sync::Arc;

use crate::backend::auth::Session;
use crate::backend::error::BackendError;
use crate::backend::messaging::ids::IdGenerator;
use crate::backend::messaging::retry::{PendingPublish, PublishRetryQueue};
use crate::backend::realtime::{chat_channel, user_chats_channel, Publisher, MAX_PAYLOAD_BYTES};
use crate::backend::store::{keys, KeyValueStore, OrderedLog};
use crate::shared::{ChatId, Message, NewMessageNotification, SenderProfile, SharedError};

/// Event published on the conversation channel
pub const INCOMING_MESSAGE_EVENT: &str = "incoming-message";

/// Event published on the counterparty's chat list channel
pub const NEW_MESSAGE_EVENT: &str = "new_message";

/// Collaborators and logic behind the message endpoints
#[derive(Clone)]
pub struct MessagingService {
    kv: Arc<dyn KeyValueStore>,
    log: Arc<dyn OrderedLog>,
    publisher: Arc<dyn Publisher>,
    ids: Arc<dyn IdGenerator>,
    retry: PublishRetryQueue,
}

impl MessagingService {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        log: Arc<dyn OrderedLog>,
        publisher: Arc<dyn Publisher>,
        ids: Arc<dyn IdGenerator>,
        retry: PublishRetryQueue,
    ) -> Self {
        Self {
            kv,
            log,
            publisher,
            ids,
            retry,
        }
    }

    /// Authorize, persist and fan out one message from `caller`
    pub async fn send(
        &self,
        caller: &Session,
        text: String,
        raw_chat_id: &str,
    ) -> Result<Message, BackendError> {
        let caller_id = caller.user.id.as_str();
        let chat_id = authorize_participant(raw_chat_id, caller_id)?;
        let counterparty = chat_id
            .counterparty(caller_id)
            .ok_or_else(BackendError::unauthorized)?
            .to_string();

        let friends = self.kv.smembers(&keys::friends(caller_id)).await?;
        if !friends.iter().any(|friend| friend == &counterparty) {
            tracing::warn!(
                "[Ingress] {} tried to message {} who is not a friend",
                caller_id,
                counterparty
            );
            return Err(BackendError::unauthorized());
        }

        let sender = self.load_profile(caller_id).await?;

        let message = Message::new(
            self.ids.next_id(),
            caller_id,
            text,
            chrono::Utc::now().timestamp_millis(),
        );
        message.validate()?;

        let member = message.to_log_member()?;
        let chat_payload = serde_json::to_value(&message)?;
        let notification_payload =
            serde_json::to_value(NewMessageNotification::new(message.clone(), &sender))?;
        check_payload_size(&message, &chat_payload)?;
        check_payload_size(&message, &notification_payload)?;

        let chat_key = chat_id.to_string();
        if let Err(e) = self
            .log
            .append(&keys::chat_messages(&chat_key), message.timestamp, &member)
            .await
        {
            tracing::error!(
                "[Ingress] Failed to persist message {} in {}: {}",
                message.id,
                chat_key,
                e
            );
            return Err(BackendError::processing());
        }

        self.deliver(chat_channel(&chat_key), INCOMING_MESSAGE_EVENT, chat_payload)
            .await;
        self.deliver(
            user_chats_channel(&counterparty),
            NEW_MESSAGE_EVENT,
            notification_payload,
        )
        .await;

        tracing::info!(
            "[Ingress] Message {} from {} stored in {}",
            message.id,
            caller_id,
            chat_key
        );
        Ok(message)
    }

    /// Messages of a conversation with `start <= timestamp <= end`
    pub async fn history(
        &self,
        caller: &Session,
        raw_chat_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<Message>, BackendError> {
        let chat_id = authorize_participant(raw_chat_id, &caller.user.id)?;

        let members = self
            .log
            .range_by_score(&keys::chat_messages(&chat_id.to_string()), start, end)
            .await?;

        Ok(members
            .iter()
            .filter_map(|member| match Message::from_log_member(member) {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::warn!("[Ingress] Skipping unreadable log entry in {}: {}", chat_id, e);
                    None
                }
            })
            .collect())
    }

    async fn load_profile(&self, user_id: &str) -> Result<SenderProfile, BackendError> {
        let raw = self.kv.get(&keys::user(user_id)).await?.ok_or_else(|| {
            BackendError::handler(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Profile not found for user {}", user_id),
            )
        })?;

        serde_json::from_str(&raw).map_err(|e| SharedError::from(e).into())
    }

    /// Publish once inline; hand retryable failures to the retry queue
    async fn deliver(&self, channel: String, event: &str, payload: Value) {
        match self.publisher.publish(&channel, event, payload.clone()).await {
            Ok(()) => {}
            Err(e) if e.is_retryable() => {
                tracing::warn!("[Ingress] Publish of {} on {} failed, queueing retry: {}", event, channel, e);
                self.retry.enqueue(PendingPublish {
                    channel,
                    event: event.to_string(),
                    payload,
                });
            }
            Err(e) => {
                tracing::error!("[Ingress] Publish of {} on {} rejected: {}", event, channel, e);
            }
        }
    }
}

/// Reject a message whose event payload the publisher would refuse
///
/// Runs before the append so an undeliverable message is never stored.
fn check_payload_size(message: &Message, payload: &Value) -> Result<(), BackendError> {
    let size = serde_json::to_vec(payload)?.len();
    if size > MAX_PAYLOAD_BYTES {
        tracing::warn!(
            "[Ingress] Message {} from {} is {} bytes, over the {} byte limit",
            message.id,
            message.sender_id,
            size,
            MAX_PAYLOAD_BYTES
        );
        return Err(SharedError::validation(
            "text",
            format!("Message exceeds the {} byte limit", MAX_PAYLOAD_BYTES),
        )
        .into());
    }
    Ok(())
}

/// Decode `raw_chat_id` and require `caller_id` to be one of its participants
pub fn authorize_participant(raw_chat_id: &str, caller_id: &str) -> Result<ChatId, BackendError> {
    let chat_id: ChatId = raw_chat_id.parse().map_err(|e: SharedError| {
        tracing::warn!("[Ingress] {}", e);
        BackendError::unauthorized()
    })?;

    if !chat_id.has_participant(caller_id) {
        tracing::warn!("[Ingress] {} is not a participant of {}", caller_id, chat_id);
        return Err(BackendError::unauthorized());
    }
    Ok(chat_id)
}
