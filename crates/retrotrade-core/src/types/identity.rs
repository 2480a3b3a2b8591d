//! Verified caller identity.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Identity yielded by an [`IdentityVerifier`](crate::traits::IdentityVerifier),
/// or attached to a request by upstream authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User owning the credential.
    pub user_id: UserId,
    /// Email claim, when the issuer includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role claim, when the issuer includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Identity {
    /// Identity carrying only a user id.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
            role: None,
        }
    }
}
