/**
 * Application State Management
 *
 * This module defines the application state structure. Handlers extract
 * the whole `State<AppState>` and pick the fields they need.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container, holding:
 * - The session resolver that identifies callers
 * - The realtime channel hub feeding SSE subscribers
 * - The messaging service with its stores, publisher and retry queue
 *
 * Every field is a cheap handle (`Arc` or a struct of `Arc`s), so cloning
 * the state per request costs a few reference count bumps.
 */

use std::sync::Arc;

use crate::backend::auth::SessionResolver;
use crate::backend::messaging::MessagingService;
use crate::backend::realtime::ChannelHub;

/// Application state shared by every handler
///
/// # Usage
///
/// ```rust,ignore
/// use axum::extract::State;
/// use xfchat::backend::server::state::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let listeners = state.hub.subscriber_count("chat__u1--u2");
/// }
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Resolves the caller from request headers
    pub sessions: Arc<dyn SessionResolver>,

    /// In-process pub/sub channels behind `/realtime/{channel}`
    pub hub: ChannelHub,

    /// Message send and history logic
    pub messaging: MessagingService,
}

impl AppState {
    pub fn new(
        sessions: Arc<dyn SessionResolver>,
        hub: ChannelHub,
        messaging: MessagingService,
    ) -> Self {
        Self {
            sessions,
            hub,
            messaging,
        }
    }
}
