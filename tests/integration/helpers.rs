//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, BodyDataStream};
use axum::http::{Request, Response, StatusCode};
use chrono::{Duration, Utc};
use futures::StreamExt;
use serde_json::Value;
use tower::ServiceExt;

use retrotrade_api::{AppState, build_app};
use retrotrade_auth::{Claims, JwtDecoder, JwtEncoder};
use retrotrade_core::config::AppConfig;
use retrotrade_core::error::AppError;
use retrotrade_core::result::AppResult;
use retrotrade_core::traits::NotificationStore;
use retrotrade_core::types::{Identity, UserId};
use retrotrade_realtime::RealtimeEngine;
use retrotrade_realtime::store::MemoryNotificationStore;

/// Internal key configured on every test app.
pub const INTERNAL_KEY: &str = "test-internal-key";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Engine behind the router
    pub engine: Arc<RealtimeEngine>,
    /// Unread counts served to new streams
    pub store: Arc<MemoryNotificationStore>,
    /// Application config
    pub config: AppConfig,
    encoder: JwtEncoder,
}

impl TestApp {
    /// Create a new test application with default settings
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application with custom settings
    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryNotificationStore::new());
        Self::build(config, store.clone(), store)
    }

    /// Create a test application whose store always fails
    pub fn with_failing_store() -> Self {
        Self::build(
            test_config(),
            Arc::new(MemoryNotificationStore::new()),
            Arc::new(FailingStore),
        )
    }

    fn build(
        config: AppConfig,
        store: Arc<MemoryNotificationStore>,
        served: Arc<dyn NotificationStore>,
    ) -> Self {
        let decoder = Arc::new(JwtDecoder::new(&config.auth));
        let encoder = JwtEncoder::new(&config.auth);
        let engine = Arc::new(RealtimeEngine::new(
            config.realtime.clone(),
            decoder.clone(),
            served,
        ));
        let router = build_app(AppState::new(config.clone(), decoder, engine.clone()));

        Self {
            router,
            engine,
            store,
            config,
            encoder,
        }
    }

    /// Mint a valid token for `user`
    pub fn token_for(&self, user: &str) -> String {
        self.encoder
            .issue(&identity(user))
            .expect("Failed to issue token")
    }

    /// Mint a token for `user` that expired an hour ago
    pub fn expired_token_for(&self, user: &str) -> String {
        self.encoder
            .issue_with_expiry(&identity(user), Utc::now() - Duration::hours(1))
            .expect("Failed to issue token")
    }

    /// Mint a token carrying `user` under both `_id` and `sub`
    pub fn token_with_sub_for(&self, user: &str) -> String {
        let claims = Claims {
            object_id: Some(user.to_string()),
            sub: Some(user.to_string()),
            exp: (Utc::now() + Duration::minutes(15)).timestamp(),
            ..Claims::default()
        };
        self.encoder.sign(&claims).expect("Failed to sign token")
    }

    /// Set the unread count the store reports for `user`
    pub fn set_unread(&self, user: &str, count: u64) {
        self.store.set_unread(&user_id(user), count);
    }

    /// Make a JSON request and read the whole response
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self.send(req).await;
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Open the notification stream, optionally with a bearer header
    pub async fn open_stream(&self, path: &str, bearer: Option<&str>) -> Response<Body> {
        let mut req = Request::builder().method("GET").uri(path);
        if let Some(token) = bearer {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let req = req.body(Body::empty()).expect("Failed to build request");
        self.send(req).await
    }

    /// Open a stream for `user` via the query string and return its reader
    pub async fn connect(&self, user: &str) -> FrameReader {
        let path = format!("/api/notifications/stream?token={}", self.token_for(user));
        let response = self.open_stream(&path, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        FrameReader::new(response)
    }

    async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request")
    }
}

/// Test response wrapper
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Reads an event-stream body one frame at a time.
pub struct FrameReader {
    stream: BodyDataStream,
    buffer: Vec<u8>,
}

impl FrameReader {
    /// Wrap a stream response
    pub fn new(response: Response<Body>) -> Self {
        Self {
            stream: response.into_body().into_data_stream(),
            buffer: Vec::new(),
        }
    }

    /// Next complete frame including its trailing blank line, or `None`
    /// once the stream has ended.
    pub async fn next_frame(&mut self) -> Option<String> {
        loop {
            if let Some(end) = find_frame_end(&self.buffer) {
                let frame: Vec<u8> = self.buffer.drain(..end).collect();
                return Some(String::from_utf8(frame).expect("Frame is not UTF-8"));
            }
            match self.stream.next().await {
                Some(chunk) => self.buffer.extend_from_slice(&chunk.expect("Body error")),
                None => return None,
            }
        }
    }
}

fn find_frame_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n").map(|i| i + 2)
}

/// Default test configuration
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.publish.api_key = Some(INTERNAL_KEY.to_string());
    config
}

/// Build a user id
pub fn user_id(raw: &str) -> UserId {
    UserId::new(raw).expect("Invalid user id")
}

fn identity(raw: &str) -> Identity {
    Identity::new(user_id(raw))
}

/// Store whose every query fails.
#[derive(Debug)]
pub struct FailingStore;

#[async_trait]
impl NotificationStore for FailingStore {
    async fn count_unread(&self, _user_id: &UserId) -> AppResult<u64> {
        Err(AppError::external_service("notification store offline"))
    }
}
