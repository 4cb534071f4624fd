//! Messaging HTTP Handlers
//!
//! This module contains the HTTP handlers for sending a message and reading
//! a conversation's history. Both resolve the caller from the request
//! headers and delegate the rest to [`MessagingService`](super::MessagingService).

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::backend::auth::Session;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::{Message, SendMessageRequest};

/// Score range for [`get_messages`]; both bounds are inclusive
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub end: Option<i64>,
}

async fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Session, BackendError> {
    state.sessions.resolve(headers).await.ok_or_else(|| {
        tracing::debug!("[Ingress] Request without a valid session");
        BackendError::unauthorized()
    })
}

/// Send a message
///
/// `POST /api/message/send` with body `{"text": "...", "chatId": "a--b"}`.
/// Responds `200 OK` once the message is in the conversation log.
pub async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, BackendError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(BackendError::bad_request("Missing request body"));
    }

    let request: SendMessageRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("[Ingress] Rejecting malformed body: {}", e);
        BackendError::bad_request("Invalid request body")
    })?;

    let (text, chat_id) = request
        .into_parts()
        .ok_or_else(|| BackendError::bad_request("Missing required fields"))?;

    let session = require_session(&state, &headers).await?;

    state.messaging.send(&session, text, &chat_id).await?;
    Ok("OK")
}

/// List a conversation's messages
///
/// `GET /api/message/{chat_id}?start=..&end=..`, ordered by timestamp.
pub async fn get_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chat_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<Message>>, BackendError> {
    let start = params.start.unwrap_or(0);
    let end = params.end.unwrap_or(i64::MAX);
    if start > end {
        return Err(BackendError::bad_request("Invalid range"));
    }

    let session = require_session(&state, &headers).await?;

    let messages = state.messaging.history(&session, &chat_id, start, end).await?;
    Ok(Json(messages))
}
