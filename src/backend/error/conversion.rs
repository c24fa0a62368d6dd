/**
 * Error Conversion
 *
 * All backend errors implement `IntoResponse` from Axum, allowing them to be
 * returned directly from handlers.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "Error message",
 *   "status": 409
 * }
 * ```
 */

use axum::{
    response::{Response, IntoResponse},
    Json,
};
use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("Request failed with {}: {}", status, self);
        } else {
            tracing::debug!("Request rejected with {}: {}", status, self);
        }

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
