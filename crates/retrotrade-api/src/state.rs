//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use retrotrade_auth::JwtDecoder;
use retrotrade_core::config::AppConfig;
use retrotrade_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// JWT decoder for `Authorization` headers
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Stream engine
    pub realtime: Arc<RealtimeEngine>,
}

impl AppState {
    /// Bundles the shared dependencies.
    pub fn new(config: AppConfig, jwt_decoder: Arc<JwtDecoder>, realtime: Arc<RealtimeEngine>) -> Self {
        Self {
            config: Arc::new(config),
            jwt_decoder,
            realtime,
        }
    }
}
