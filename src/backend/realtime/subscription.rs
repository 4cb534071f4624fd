/**
 * Real-time Subscription Handler
 *
 * Server-Sent Events endpoint for the channels the message handlers publish
 * to (`GET /realtime/{channel}`).
 *
 * # Authorization
 *
 * - `chat__{chatId}` - the caller must be one of the two participants
 * - `user__{id}__chats` - the caller must be `{id}`
 *
 * Any other channel name is rejected with `400 Bad Request`; a request
 * without a valid session gets `401 Unauthorized`.
 *
 * # Stream Format
 *
 * Each pub/sub event becomes one SSE event whose name is the pub/sub event
 * name (`incoming-message`, `new_message`) and whose data is the JSON
 * payload. Keep-alive comments hold idle connections open; a subscriber that
 * lags behind skips the missed events and keeps listening.
 */

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream};
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::ChatId;

/// Which conversation or user a channel name belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelScope {
    Chat(ChatId),
    UserChats(String),
}

impl ChannelScope {
    /// Decode a channel name produced by `chat_channel` / `user_chats_channel`
    pub fn parse(channel: &str) -> Option<Self> {
        if let Some(chat_id) = channel.strip_prefix("chat__") {
            return chat_id.parse().ok().map(ChannelScope::Chat);
        }
        channel
            .strip_prefix("user__")
            .and_then(|rest| rest.strip_suffix("__chats"))
            .filter(|user_id| !user_id.is_empty())
            .map(|user_id| ChannelScope::UserChats(user_id.to_string()))
    }

    pub fn allows(&self, user_id: &str) -> bool {
        match self {
            ChannelScope::Chat(chat_id) => chat_id.has_participant(user_id),
            ChannelScope::UserChats(owner) => owner == user_id,
        }
    }
}

/// Handle a realtime subscription (GET /realtime/{channel})
///
/// # Errors
///
/// * `400 Bad Request` - unknown channel name
/// * `401 Unauthorized` - no session, or the caller may not read the channel
pub async fn subscribe_channel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(channel): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, BackendError> {
    let scope = ChannelScope::parse(&channel).ok_or_else(|| {
        tracing::warn!("[Realtime] Rejected subscription to unknown channel {}", channel);
        BackendError::handler(StatusCode::BAD_REQUEST, "Unknown channel")
    })?;

    let session = state
        .sessions
        .resolve(&headers)
        .await
        .ok_or_else(BackendError::unauthorized)?;

    if !scope.allows(&session.user.id) {
        tracing::warn!(
            "[Realtime] User {} may not subscribe to {}",
            session.user.id,
            channel
        );
        return Err(BackendError::unauthorized());
    }

    let rx = state.hub.subscribe(&channel);
    tracing::info!("[Realtime] User {} subscribed to {}", session.user.id, channel);

    let stream = stream::unfold((rx, channel), |(mut rx, channel)| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let sse_event = Event::default()
                        .event(event.event.as_str())
                        .data(event.data.to_string());
                    return Some((Ok(sse_event), (rx, channel)));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Realtime] Subscriber on {} lagged, skipped {} events", channel, skipped);
                    continue;
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("[Realtime] Channel {} closed, ending stream", channel);
                    return None;
                }
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
