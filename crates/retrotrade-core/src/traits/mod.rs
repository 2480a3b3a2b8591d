//! Collaborator traits consumed by the delivery core and implemented by
//! other crates.

pub mod identity;
pub mod notification_store;

pub use identity::IdentityVerifier;
pub use notification_store::NotificationStore;
