//! Integration tests for the internal publish endpoint.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{INTERNAL_KEY, TestApp};

const PUBLISH: &str = "/api/notifications/publish";

fn offer_event(user: &str) -> serde_json::Value {
    json!({
        "userId": user,
        "event": { "type": "new_offer", "data": { "offerId": "o-1" } }
    })
}

#[tokio::test]
async fn test_publish_reaches_every_session_of_user() {
    let app = TestApp::new();
    let mut tab1 = app.connect("alice").await;
    let mut tab2 = app.connect("alice").await;
    let mut other = app.connect("bob").await;
    for reader in [&mut tab1, &mut tab2, &mut other] {
        reader.next_frame().await.expect("connected");
        reader.next_frame().await.expect("snapshot");
    }

    let response = app
        .request(
            "POST",
            PUBLISH,
            Some(offer_event("alice")),
            &[("X-Internal-Key", INTERNAL_KEY)],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "delivered": 2, "dropped": 0, "reaped": 0 }));

    let expected = "data: {\"type\":\"new_offer\",\"data\":{\"offerId\":\"o-1\"}}\n\n";
    assert_eq!(tab1.next_frame().await.as_deref(), Some(expected));
    assert_eq!(tab2.next_frame().await.as_deref(), Some(expected));
    assert_eq!(app.engine.metrics.snapshot().events_published, 1);
}

#[tokio::test]
async fn test_publish_to_disconnected_user_delivers_nothing() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            PUBLISH,
            Some(offer_event("nobody")),
            &[("X-Internal-Key", INTERNAL_KEY)],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "delivered": 0, "dropped": 0, "reaped": 0 }));
}

#[tokio::test]
async fn test_wrong_key_is_forbidden() {
    let app = TestApp::new();
    let _alice = app.connect("alice").await;

    let response = app
        .request(
            "POST",
            PUBLISH,
            Some(offer_event("alice")),
            &[("X-Internal-Key", "guess")],
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("POST", PUBLISH, Some(offer_event("alice")), &[])
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    assert_eq!(app.engine.metrics.snapshot().events_published, 0);
}

#[tokio::test]
async fn test_publishing_disabled_without_key() {
    let mut config = helpers::test_config();
    config.publish.api_key = None;
    let app = TestApp::with_config(config);

    let response = app
        .request(
            "POST",
            PUBLISH,
            Some(offer_event("alice")),
            &[("X-Internal-Key", INTERNAL_KEY)],
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_payloads_are_rejected() {
    let app = TestApp::new();
    let key = [("X-Internal-Key", INTERNAL_KEY)];

    let blank_user = json!({ "userId": "  ", "event": { "type": "new_offer", "data": {} } });
    let response = app.request("POST", PUBLISH, Some(blank_user), &key).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let blank_type = json!({ "userId": "alice", "event": { "type": "", "data": {} } });
    let response = app.request("POST", PUBLISH, Some(blank_type), &key).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let missing_event = json!({ "userId": "alice" });
    let response = app.request("POST", PUBLISH, Some(missing_event), &key).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["message"].is_string());
}
