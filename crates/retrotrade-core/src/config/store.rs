//! Notification store configuration.

use serde::{Deserialize, Serialize};

/// Which notification store answers unread-count queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreProvider {
    /// Process-local counters.
    #[default]
    Memory,
    /// The RetroTrade backend over HTTP.
    Http,
}

/// Notification store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store provider.
    #[serde(default)]
    pub provider: StoreProvider,
    /// Settings for the HTTP provider.
    #[serde(default)]
    pub http: HttpStoreConfig,
}

/// HTTP-backed notification store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpStoreConfig {
    /// Backend base URL, e.g. `http://backend:9999`.
    #[serde(default)]
    pub base_url: String,
    /// Path of the unread-count endpoint.
    #[serde(default = "default_unread_path")]
    pub unread_path: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            unread_path: default_unread_path(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_unread_path() -> String {
    "/api/notifications/unread-count".to_string()
}

fn default_timeout() -> u64 {
    5
}
