//! Unread counts from the RetroTrade backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use retrotrade_core::config::HttpStoreConfig;
use retrotrade_core::error::{AppError, ErrorKind};
use retrotrade_core::result::AppResult;
use retrotrade_core::traits::NotificationStore;
use retrotrade_core::types::UserId;

#[derive(Debug, Deserialize)]
struct UnreadCountResponse {
    #[serde(rename = "unreadCount")]
    unread_count: u64,
}

/// Queries `GET {base_url}{unread_path}?userId=<id>`.
#[derive(Debug, Clone)]
pub struct HttpNotificationStore {
    client: Client,
    endpoint: Url,
}

impl HttpNotificationStore {
    /// Creates a store for the configured backend.
    pub fn new(config: &HttpStoreConfig) -> AppResult<Self> {
        let raw = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            config.unread_path
        );
        let endpoint = Url::parse(&raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid notification store URL '{raw}'"),
                e,
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build notification store client",
                    e,
                )
            })?;

        Ok(Self { client, endpoint })
    }

    fn url_for(&self, user_id: &UserId) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("userId", user_id.as_str());
        url
    }
}

#[async_trait]
impl NotificationStore for HttpNotificationStore {
    async fn count_unread(&self, user_id: &UserId) -> AppResult<u64> {
        let url = self.url_for(user_id);
        debug!(user_id = %user_id, "Querying unread count");

        let response = self.client.get(url).send().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Notification store request failed", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "Notification store responded with {status}"
            )));
        }

        let body: UnreadCountResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Notification store returned an unreadable body",
                e,
            )
        })?;
        Ok(body.unread_count)
    }
}
