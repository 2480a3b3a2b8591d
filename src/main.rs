//! RetroTrade notification service
//!
//! Main entry point that wires all crates together and starts the server.

use std::future::IntoFuture;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use tracing_subscriber::{EnvFilter, fmt};

use retrotrade_api::{AppState, build_app};
use retrotrade_auth::JwtDecoder;
use retrotrade_core::config::AppConfig;
use retrotrade_core::error::AppError;
use retrotrade_realtime::{RealtimeEngine, build_store};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("RETROTRADE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting RetroTrade notifications v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Collaborators ────────────────────────────────────
    tracing::info!(provider = ?config.store.provider, "Initializing notification store");
    let store = build_store(&config.store)?;
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    // ── Step 2: Realtime engine ──────────────────────────────────
    let engine = RealtimeEngine::new(config.realtime.clone(), jwt_decoder.clone(), store)
        .connect_fanout(&config.fanout)
        .await?;
    let engine = Arc::new(engine);

    // ── Step 3: Build and start HTTP server ──────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let state = AppState::new(config, jwt_decoder, engine.clone());
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Notification server listening on {}", addr);

    let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
    let shutdown_engine = engine.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, closing streams...");
        // Open streams never finish on their own; end them so the server can drain.
        if let Err(e) = shutdown_engine.shutdown() {
            tracing::error!(error = %e, "Real-time engine shutdown failed");
        }
        let _ = signalled_tx.send(());
    });
    let mut server = pin!(server.into_future());

    let deadline = async {
        match signalled_rx.await {
            Ok(()) => tokio::time::sleep(grace).await,
            Err(_) => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = server.as_mut() => {
            result.map_err(|e| AppError::internal(format!("Server error: {e}")))?;
        }
        _ = deadline => tracing::warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out"),
    }

    tracing::info!("Notification server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
