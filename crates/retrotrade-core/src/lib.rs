//! # retrotrade-core
//!
//! Core crate for the RetroTrade notification service. Contains the
//! configuration schemas, typed identifiers, collaborator traits consumed
//! by the delivery core, and the unified error system.
//!
//! This crate has **no** internal dependencies on other RetroTrade crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
