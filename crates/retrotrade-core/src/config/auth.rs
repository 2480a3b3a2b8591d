//! Token verification configuration.

use serde::{Deserialize, Serialize};

/// JWT verification settings. Tokens are issued by the RetroTrade backend;
/// this service only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC-SHA256 secret.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Allowed clock skew when checking `exp`, in seconds.
    #[serde(default = "default_leeway")]
    pub jwt_leeway_seconds: u64,
    /// Lifetime of tokens minted locally (tests and tooling), in minutes.
    #[serde(default = "default_access_ttl")]
    pub jwt_access_ttl_minutes: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_leeway_seconds: default_leeway(),
            jwt_access_ttl_minutes: default_access_ttl(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_leeway() -> u64 {
    5
}

fn default_access_ttl() -> u64 {
    60
}
