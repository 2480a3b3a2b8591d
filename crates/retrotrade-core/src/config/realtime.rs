//! Stream session, publish, and fan-out configuration.

use serde::{Deserialize, Serialize};

/// Stream session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Seconds between heartbeat comment frames.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Outbound frame queue size per session.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Maximum simultaneous streams per user; the oldest is evicted beyond this.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Comment text written when a stream opens.
    #[serde(default = "default_connected_comment")]
    pub connected_comment: String,
    /// Comment text written on every heartbeat.
    #[serde(default = "default_heartbeat_comment")]
    pub heartbeat_comment: String,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_seconds: default_heartbeat_interval(),
            channel_buffer_size: default_channel_buffer(),
            max_connections_per_user: default_max_connections_per_user(),
            connected_comment: default_connected_comment(),
            heartbeat_comment: default_heartbeat_comment(),
        }
    }
}

/// Internal publish endpoint settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Shared key expected in `X-Internal-Key`. The endpoint refuses every
    /// request when unset.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// How published events reach the sessions that should receive them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutProvider {
    /// Deliver straight into this process's registry.
    #[default]
    Local,
    /// Relay through a Redis channel so every process sees every event.
    Redis,
}

/// Cross-process fan-out settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanOutConfig {
    /// Fan-out provider.
    #[serde(default)]
    pub provider: FanOutProvider,
    /// Redis URL for the `redis` provider.
    #[serde(default)]
    pub redis_url: String,
    /// Redis channel carrying notification envelopes.
    #[serde(default = "default_fanout_channel")]
    pub channel: String,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            provider: FanOutProvider::default(),
            redis_url: String::new(),
            channel: default_fanout_channel(),
        }
    }
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_channel_buffer() -> usize {
    64
}

fn default_max_connections_per_user() -> usize {
    10
}

fn default_connected_comment() -> String {
    "connected".to_string()
}

fn default_heartbeat_comment() -> String {
    "heartbeat".to_string()
}

fn default_fanout_channel() -> String {
    "retrotrade:notifications".to_string()
}
