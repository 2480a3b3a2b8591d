//! Route definitions for the notification service.
//!
//! All routes are mounted under `/api`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes(state.clone()))
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Stream and publish endpoints
fn notification_routes(state: AppState) -> Router<AppState> {
    let stream = Router::new()
        .route(
            "/notifications/stream",
            get(handlers::stream::notification_stream),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::auth::attach_identity,
        ));

    Router::new()
        .merge(stream)
        .route("/notifications/publish", post(handlers::notification::publish))
}

/// Health endpoint
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
