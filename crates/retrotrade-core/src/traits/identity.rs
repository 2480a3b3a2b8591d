//! Bearer credential verification.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::Identity;

/// Validates a bearer credential and yields the caller's identity.
///
/// Implementations fail with [`ErrorKind::InvalidToken`](crate::error::ErrorKind::InvalidToken)
/// for malformed, forged, expired, or revoked tokens. Other error kinds are
/// reserved for infrastructure failures (e.g. a remote key fetch).
#[async_trait]
pub trait IdentityVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Verify `token` and return the identity it carries.
    async fn verify(&self, token: &str) -> AppResult<Identity>;
}
