//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use retrotrade_core::error::{AppError, ErrorKind};

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable message.
    pub message: String,
    /// Underlying cause, only for server-side failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized | ErrorKind::InvalidToken => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::ExternalService => StatusCode::BAD_GATEWAY,
        ErrorKind::SnapshotUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::DeadConnection
        | ErrorKind::Configuration
        | ErrorKind::Serialization
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(self.kind);

        let error = if status.is_server_error() {
            tracing::error!(kind = %self.kind, error = %self.detail(), "{}", self.message);
            Some(self.detail())
        } else {
            None
        };

        let body = ApiErrorResponse {
            message: self.message,
            error,
        };

        (status, Json(body)).into_response()
    }
}
