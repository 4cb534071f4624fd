/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Health check
 * 2. Realtime subscriptions (SSE)
 * 3. API routes (message send and history)
 * 4. Fallback handler (404)
 *
 * Every request runs through `TraceLayer`, so each one gets a span with its
 * method, path and latency.
 */

use axum::{http::StatusCode, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::backend::realtime::subscribe_channel;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Route Details
///
/// - `GET /health` - Liveness probe, always `200 OK`
/// - `GET /realtime/{channel}` - SSE stream of one channel (requires a session)
/// - `POST /api/message/send` - Send a message (requires a session)
/// - `GET /api/message/{chat_id}` - Conversation history (requires a session)
///
/// Unknown routes fall through to a plain `404 Not Found`.
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/realtime/{channel}", get(subscribe_channel));

    let router = configure_api_routes(router);

    let router = router.fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") });

    router
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
