//! Event-stream handler.

use axum::Extension;
use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use retrotrade_core::error::AppError;
use retrotrade_core::types::Identity;
use retrotrade_realtime::StreamCredential;

use crate::state::AppState;

/// Query parameters for the stream endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    /// Bearer token, for clients that cannot set headers.
    pub token: Option<String>,
}

/// GET /api/notifications/stream
///
/// Any failure is returned before the first byte of the stream. Once the
/// response is built the stream only ends by closing.
pub async fn notification_stream(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    query: Result<Query<StreamQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(|e| {
        tracing::debug!(error = %e, "Rejected stream query string");
        AppError::invalid_token()
    })?;

    let credential = StreamCredential {
        verified: identity.map(|Extension(identity)| identity),
        query_token: query.token,
    };

    let opened = state.realtime.open_stream(credential).await?;

    let headers = [
        (header::CONTENT_TYPE, "text/event-stream"),
        (header::CACHE_CONTROL, "no-cache"),
        (header::CONNECTION, "keep-alive"),
        (header::HeaderName::from_static("x-accel-buffering"), "no"),
    ];

    Ok((headers, Body::from_stream(opened.body)).into_response())
}
