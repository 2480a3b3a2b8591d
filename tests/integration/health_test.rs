//! Integration tests for the health endpoint.

mod helpers;

use axum::http::StatusCode;

use helpers::TestApp;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["connections"], 0);
    assert!(response.body["version"].is_string());
}

#[tokio::test]
async fn test_health_counts_open_streams() {
    let app = TestApp::new();
    let _tab1 = app.connect("alice").await;
    let _tab2 = app.connect("alice").await;
    let _bob = app.connect("bob").await;

    let response = app.request("GET", "/api/health", None, &[]).await;

    assert_eq!(response.body["connections"], 3);
    assert_eq!(response.body["users"], 2);
    assert_eq!(response.body["metrics"]["sessionsOpened"], 3);
}
