/**
 * Error Conversion
 *
 * All backend errors implement `IntoResponse`, so handlers return them
 * directly. Server-side failures are logged here with their full detail
 * before the generic body is sent.
 *
 * Extractor rejections (a body that is not valid JSON for the route, a
 * path segment that is not a UUID) convert into a 400 `validation` error,
 * so every failure shares the same body.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "Error message",
 *   "kind": "forbidden",
 *   "status": 403
 * }
 * ```
 */
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::BackendError;
use crate::shared::messaging::ErrorResponse;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ErrorResponse {
            error: self.message(),
            kind: Some(self.kind().to_string()),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for BackendError {
    fn from(rejection: JsonRejection) -> Self {
        BackendError::handler(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<PathRejection> for BackendError {
    fn from(rejection: PathRejection) -> Self {
        BackendError::handler(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}
