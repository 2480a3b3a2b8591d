//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! optional TOML files plus `RETROTRADE__*` environment variables. Each
//! sub-module represents a logical configuration section.

pub mod app;
pub mod auth;
pub mod logging;
pub mod realtime;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::{FanOutConfig, PublishConfig, RealtimeConfig};
pub use self::store::{HttpStoreConfig, StoreConfig};

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Token verification settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Stream session settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Notification store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Internal publish endpoint settings.
    #[serde(default)]
    pub publish: PublishConfig,
    /// Cross-process fan-out settings.
    #[serde(default)]
    pub fanout: FanOutConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `config/default`, an environment-specific overlay
    /// (`config/{env}`), and environment variables prefixed with
    /// `RETROTRADE` using `__` as the section separator.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("RETROTRADE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Rejects values the delivery core cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.realtime.heartbeat_interval_seconds == 0 {
            return Err(AppError::configuration(
                "realtime.heartbeat_interval_seconds must be greater than zero",
            ));
        }
        if self.realtime.channel_buffer_size == 0 {
            return Err(AppError::configuration(
                "realtime.channel_buffer_size must be greater than zero",
            ));
        }
        if self.realtime.max_connections_per_user == 0 {
            return Err(AppError::configuration(
                "realtime.max_connections_per_user must be greater than zero",
            ));
        }
        if self.auth.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if self.store.provider == store::StoreProvider::Http && self.store.http.base_url.is_empty()
        {
            return Err(AppError::configuration(
                "store.http.base_url is required when store.provider = \"http\"",
            ));
        }
        if self.fanout.provider == realtime::FanOutProvider::Redis && self.fanout.redis_url.is_empty()
        {
            return Err(AppError::configuration(
                "fanout.redis_url is required when fanout.provider = \"redis\"",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.realtime.heartbeat_interval_seconds, 30);
        assert_eq!(config.server.port, 4001);
    }

    #[test]
    fn test_zero_heartbeat_rejected() {
        let mut config = AppConfig::default();
        config.realtime.heartbeat_interval_seconds = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_http_store_requires_base_url() {
        let mut config = AppConfig::default();
        config.store.provider = store::StoreProvider::Http;
        assert!(config.validate().is_err());

        config.store.http.base_url = "http://backend:9999".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let raw = r#"
            [realtime]
            heartbeat_interval_seconds = 15

            [logging]
            format = "pretty"
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize");

        assert_eq!(config.realtime.heartbeat_interval_seconds, 15);
        assert_eq!(config.realtime.channel_buffer_size, 64);
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.logging.level, "info");
    }
}
