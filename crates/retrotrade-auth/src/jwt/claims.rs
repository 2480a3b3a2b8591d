//! JWT claims structure used in backend-issued access tokens.

use serde::{Deserialize, Serialize};

use retrotrade_core::error::AppError;
use retrotrade_core::types::{Identity, UserId};

/// Claims payload of a RetroTrade access token.
///
/// The backend signs `{ _id, email, role }`. Tokens from other issuers may
/// carry the user id as `sub`, `id`, or `userId` instead of or next to `_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    /// User ID as signed by the backend.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    /// Standard subject claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// User role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// The user id, taken from `_id`, `sub`, `id`, then `userId`.
    ///
    /// Blank values are skipped.
    pub fn subject(&self) -> Option<&str> {
        [&self.object_id, &self.sub, &self.id, &self.user_id]
            .into_iter()
            .filter_map(|candidate| candidate.as_deref())
            .find(|value| !value.trim().is_empty())
    }

    /// Converts the claims into the identity handed to the delivery core.
    pub fn into_identity(self) -> Result<Identity, AppError> {
        let raw = self.subject().ok_or_else(AppError::invalid_token)?;
        let user_id = UserId::new(raw).map_err(|_| AppError::invalid_token())?;
        Ok(Identity {
            user_id,
            email: self.email,
            role: self.role,
        })
    }
}
