//! Shared domain types.

pub mod id;
pub mod identity;

pub use id::UserId;
pub use identity::Identity;
