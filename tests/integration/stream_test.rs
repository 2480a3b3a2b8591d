//! Integration tests for the notification stream endpoint.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use axum::http::header;
use tokio::time::Instant;

use helpers::{FrameReader, TestApp, user_id};

const UNREAD_3: &str = "data: {\"type\":\"unread_count\",\"data\":{\"unreadCount\":3}}\n\n";

#[tokio::test(start_paused = true)]
async fn test_stream_confirms_then_snapshot_then_heartbeats() {
    let app = TestApp::new();
    app.set_unread("alice", 3);

    let path = format!("/api/notifications/stream?token={}", app.token_for("alice"));
    let response = app.open_stream(&path, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(headers[header::CONNECTION], "keep-alive");
    assert_eq!(headers["x-accel-buffering"], "no");

    assert_eq!(app.engine.connections.connection_count(), 1);
    assert_eq!(app.engine.connections.user_sessions(&user_id("alice")).len(), 1);

    let mut reader = FrameReader::new(response);
    assert_eq!(reader.next_frame().await.as_deref(), Some(": connected\n\n"));
    assert_eq!(reader.next_frame().await.as_deref(), Some(UNREAD_3));

    let start = Instant::now();
    assert_eq!(reader.next_frame().await.as_deref(), Some(": heartbeat\n\n"));
    assert_interval(start.elapsed(), 30);

    assert_eq!(reader.next_frame().await.as_deref(), Some(": heartbeat\n\n"));
    assert_interval(start.elapsed(), 60);
}

fn assert_interval(elapsed: Duration, secs: u64) {
    assert!(
        elapsed >= Duration::from_secs(secs) && elapsed < Duration::from_secs(secs + 1),
        "expected ~{secs}s, got {elapsed:?}"
    );
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/notifications/stream", None, &[])
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.body.get("message").is_some());
    assert_eq!(app.engine.connections.connection_count(), 0);
}

#[tokio::test]
async fn test_expired_query_token_is_rejected() {
    let app = TestApp::new();
    let path = format!(
        "/api/notifications/stream?token={}",
        app.expired_token_for("alice")
    );

    let response = app.request("GET", &path, None, &[]).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, serde_json::json!({ "message": "Invalid token" }));
    assert_eq!(app.engine.connections.connection_count(), 0);
    assert!(!app.engine.connections.is_user_connected(&user_id("alice")));
}

#[tokio::test]
async fn test_token_with_sub_and_underscore_id_opens_stream() {
    let app = TestApp::new();
    let path = format!(
        "/api/notifications/stream?token={}",
        app.token_with_sub_for("alice")
    );

    let response = app.open_stream(&path, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.engine.connections.is_user_connected(&user_id("alice")));
    let mut reader = FrameReader::new(response);
    assert_eq!(reader.next_frame().await.as_deref(), Some(": connected\n\n"));
}

#[tokio::test]
async fn test_repeated_token_parameter_is_rejected_as_json() {
    let app = TestApp::new();
    let token = app.token_for("alice");
    let path = format!("/api/notifications/stream?token={token}&token={token}");

    let response = app.request("GET", &path, None, &[]).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, serde_json::json!({ "message": "Invalid token" }));
    assert_eq!(app.engine.connections.connection_count(), 0);
}

#[tokio::test]
async fn test_forged_query_token_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/notifications/stream?token=not.a.jwt", None, &[])
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid token");
    assert_eq!(app.engine.metrics.snapshot().sessions_opened, 0);
}

#[tokio::test]
async fn test_bearer_header_wins_over_query_token() {
    let app = TestApp::new();
    let token = app.token_for("bob");

    let response = app
        .open_stream("/api/notifications/stream?token=garbage", Some(&token))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.engine.connections.is_user_connected(&user_id("bob")));
}

#[tokio::test]
async fn test_invalid_bearer_header_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request(
            "GET",
            "/api/notifications/stream",
            None,
            &[("Authorization", "Bearer nope")],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid token");
    assert_eq!(app.engine.connections.connection_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_store_failure_keeps_stream_alive() {
    let app = TestApp::with_failing_store();
    let mut reader = app.connect("alice").await;

    assert_eq!(reader.next_frame().await.as_deref(), Some(": connected\n\n"));
    assert_eq!(reader.next_frame().await.as_deref(), Some(": heartbeat\n\n"));
    assert_eq!(reader.next_frame().await.as_deref(), Some(": heartbeat\n\n"));

    assert!(app.engine.connections.is_user_connected(&user_id("alice")));
    assert_eq!(app.engine.metrics.snapshot().snapshots_failed, 1);
}

#[tokio::test]
async fn test_dropping_response_unregisters_session() {
    let app = TestApp::new();
    let reader = app.connect("alice").await;
    let sessions = app.engine.connections.user_sessions(&user_id("alice"));
    assert_eq!(sessions.len(), 1);

    drop(reader);

    assert_eq!(app.engine.connections.connection_count(), 0);
    assert!(!app.engine.connections.is_user_connected(&user_id("alice")));
}

#[tokio::test]
async fn test_shutdown_ends_every_stream() {
    let app = TestApp::new();
    let mut alice = app.connect("alice").await;
    let mut bob = app.connect("bob").await;
    for reader in [&mut alice, &mut bob] {
        reader.next_frame().await.expect("connected");
        reader.next_frame().await.expect("snapshot");
    }

    app.engine.shutdown().expect("shutdown");

    assert_eq!(alice.next_frame().await, None);
    assert_eq!(bob.next_frame().await, None);
    assert_eq!(app.engine.connections.connection_count(), 0);
}

#[tokio::test]
async fn test_oldest_stream_evicted_at_cap() {
    let mut config = helpers::test_config();
    config.realtime.max_connections_per_user = 2;
    let app = TestApp::with_config(config);

    let mut first = app.connect("alice").await;
    let _second = app.connect("alice").await;
    let _third = app.connect("alice").await;

    assert_eq!(app.engine.connections.user_sessions(&user_id("alice")).len(), 2);
    assert_eq!(first.next_frame().await, None);
    assert_eq!(app.engine.metrics.snapshot().sessions_evicted, 1);
}

#[tokio::test]
async fn test_streams_of_other_users_are_independent() {
    let app = TestApp::new();
    let alice = app.connect("alice").await;
    let _bob = app.connect("bob").await;

    drop(alice);

    assert!(!app.engine.connections.is_user_connected(&user_id("alice")));
    assert!(app.engine.connections.is_user_connected(&user_id("bob")));
}
