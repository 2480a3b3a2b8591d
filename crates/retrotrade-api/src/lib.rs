//! # retrotrade-api
//!
//! HTTP layer for the RetroTrade notification service built on Axum.
//!
//! Provides the event-stream endpoint, the internal publish endpoint, health,
//! middleware (identity, CORS, logging), and error mapping.

pub mod app;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use state::AppState;
