//! JWT token creation.
//!
//! Production tokens come from the RetroTrade backend; this encoder produces
//! tokens with the same layout for tests and local tooling.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use retrotrade_core::config::AuthConfig;
use retrotrade_core::error::AppError;
use retrotrade_core::types::Identity;

use super::claims::Claims;

/// Creates signed access tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Access token TTL in minutes.
    access_ttl_minutes: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl_minutes: config.jwt_access_ttl_minutes as i64,
        }
    }

    /// Issues an access token valid for the configured TTL.
    pub fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        let exp = Utc::now() + chrono::Duration::minutes(self.access_ttl_minutes);
        self.issue_with_expiry(identity, exp)
    }

    /// Issues an access token expiring at `expires_at`.
    pub fn issue_with_expiry(
        &self,
        identity: &Identity,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let claims = Claims {
            object_id: Some(identity.user_id.to_string()),
            email: identity.email.clone(),
            role: identity.role.clone(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
            ..Claims::default()
        };

        self.sign(&claims)
    }

    /// Signs an arbitrary claims payload.
    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))
    }
}
