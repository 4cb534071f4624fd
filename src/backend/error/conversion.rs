/**
 * Error Conversion
 *
 * Converts backend errors into HTTP responses. Bodies are plain text
 * (`Unauthorized`, `Missing required fields`, ...) so clients can show
 * them as-is.
 */

use axum::{
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("[Http] {} {}", status.as_u16(), message);
        } else {
            tracing::debug!("[Http] {} {}", status.as_u16(), message);
        }

        (
            status,
            [(CONTENT_TYPE, "text/plain; charset=utf-8")],
            message,
        )
            .into_response()
    }
}
