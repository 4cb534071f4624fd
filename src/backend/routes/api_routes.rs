/**
 * API Route Handlers
 *
 * # Routes
 *
 * ## Messages
 * - `POST /api/message/send` - Send a message to a conversation
 * - `GET /api/message/{chat_id}` - Read a conversation's history
 *
 * Both require a session token in the `Authorization` header.
 */

use axum::{
    routing::{get, post},
    Router,
};

use crate::backend::messaging::handlers::{get_messages, send_message};
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/message/send", post(send_message))
        .route("/api/message/{chat_id}", get(get_messages))
}
