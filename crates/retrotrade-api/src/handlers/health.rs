//! Health check handler.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use retrotrade_realtime::metrics::MetricsSnapshot;

use crate::state::AppState;

/// Health response body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Open stream sessions.
    pub connections: usize,
    /// Users with at least one open stream.
    pub users: usize,
    /// Engine counters.
    pub metrics: MetricsSnapshot,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = &state.realtime;
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        connections: engine.connections.connection_count(),
        users: engine.connections.user_count(),
        metrics: engine.metrics.snapshot(),
    })
}
