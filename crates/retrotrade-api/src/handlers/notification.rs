//! Internal publish handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderMap;
use serde::Deserialize;

use retrotrade_core::error::AppError;
use retrotrade_core::types::UserId;
use retrotrade_realtime::{NotificationEvent, PublishReceipt};

use crate::state::AppState;

/// Header carrying the shared internal key.
pub const INTERNAL_KEY_HEADER: &str = "x-internal-key";

/// Body of a publish request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    /// Recipient.
    pub user_id: String,
    /// Event to deliver, passed through unvalidated apart from its type.
    pub event: NotificationEvent,
}

/// POST /api/notifications/publish
pub async fn publish(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PublishRequest>, JsonRejection>,
) -> Result<Json<PublishReceipt>, AppError> {
    check_internal_key(state.config.publish.api_key.as_deref(), &headers)?;

    let Json(request) = payload.map_err(|e| AppError::validation(e.body_text()))?;

    let user_id = UserId::new(request.user_id)?;
    if request.event.event_type.trim().is_empty() {
        return Err(AppError::validation("Event type must not be empty"));
    }

    let receipt = state.realtime.publish(&user_id, &request.event).await?;
    Ok(Json(receipt))
}

fn check_internal_key(expected: Option<&str>, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = expected.filter(|k| !k.is_empty()) else {
        return Err(AppError::forbidden("Publishing is disabled"));
    };

    let presented = headers
        .get(INTERNAL_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if presented != Some(expected) {
        return Err(AppError::forbidden("Invalid internal key"));
    }
    Ok(())
}
