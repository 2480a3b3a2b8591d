//! JWT token validation.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use tracing::debug;

use retrotrade_core::config::AuthConfig;
use retrotrade_core::error::AppError;
use retrotrade_core::traits::IdentityVerifier;
use retrotrade_core::types::Identity;

use super::claims::Claims;

/// Validates backend-issued JWTs.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = config.jwt_leeway_seconds;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a token string.
    ///
    /// Every failure maps to the same `InvalidToken` error; the concrete
    /// reason is only logged.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        debug!("Rejected expired token");
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        debug!("Rejected token with invalid signature");
                    }
                    _ => debug!(error = %e, "Rejected malformed token"),
                }
                AppError::invalid_token()
            })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl IdentityVerifier for JwtDecoder {
    async fn verify(&self, token: &str) -> Result<Identity, AppError> {
        self.decode(token)?.into_identity()
    }
}
