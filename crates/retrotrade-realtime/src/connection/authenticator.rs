//! Stream authentication: resolves the caller from an upstream-verified
//! identity or a `?token=` query parameter.
//!
//! Browsers' `EventSource` cannot attach an `Authorization` header, so the
//! token is also accepted on the query string.

use std::sync::Arc;

use tracing::debug;

use retrotrade_core::error::AppError;
use retrotrade_core::traits::IdentityVerifier;
use retrotrade_core::types::Identity;

/// Credentials presented when opening a stream.
#[derive(Debug, Clone, Default)]
pub struct StreamCredential {
    /// Identity already verified by upstream middleware.
    pub verified: Option<Identity>,
    /// Raw token from the query string.
    pub query_token: Option<String>,
}

impl StreamCredential {
    /// Credential carrying an upstream-verified identity.
    pub fn verified(identity: Identity) -> Self {
        Self {
            verified: Some(identity),
            query_token: None,
        }
    }

    /// Credential carrying only a query-string token.
    pub fn query_token(token: impl Into<String>) -> Self {
        Self {
            verified: None,
            query_token: Some(token.into()),
        }
    }
}

/// Authenticates stream requests.
#[derive(Clone)]
pub struct StreamAuthenticator {
    /// Token verifier.
    verifier: Arc<dyn IdentityVerifier>,
}

impl std::fmt::Debug for StreamAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamAuthenticator").finish()
    }
}

impl StreamAuthenticator {
    /// Creates a new stream authenticator.
    pub fn new(verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { verifier }
    }

    /// Resolves the caller's identity.
    ///
    /// An upstream-verified identity wins and the query token is not
    /// inspected. Otherwise a non-empty query token is verified; failing that
    /// the request is unauthorized.
    pub async fn resolve(&self, credential: StreamCredential) -> Result<Identity, AppError> {
        if let Some(identity) = credential.verified {
            return Ok(identity);
        }

        let token = credential
            .query_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("No token provided"))?;

        let identity = self.verifier.verify(token).await?;
        debug!(user_id = %identity.user_id, "Stream token verified");
        Ok(identity)
    }
}
