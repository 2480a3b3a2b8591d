//! Opaque user identifier.
//!
//! The RetroTrade backend keys users by Mongo ObjectId hex strings, but the
//! delivery core never interprets them; it only needs equality and hashing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Identifier of the user owning a stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identifier. Empty or whitespace-only values are rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self, AppError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("User id must not be empty"));
        }
        if trimmed.len() == raw.len() {
            Ok(Self(raw))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the raw identifier.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_rejects_blank() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("   ").is_err());
    }

    #[test]
    fn test_user_id_trims() {
        let id = UserId::new(" 64b7f0c2a1e4 ").expect("valid");
        assert_eq!(id.as_str(), "64b7f0c2a1e4");
    }

    #[test]
    fn test_user_id_from_str() {
        let id: UserId = "64b7f0c2a1e4d5f6a7b8c9d0".parse().expect("should parse");
        assert_eq!(id.to_string(), "64b7f0c2a1e4d5f6a7b8c9d0");
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = UserId::new("u-1").expect("valid");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"u-1\"");
        let parsed: UserId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
