//! # retrotrade-auth
//!
//! Verification of the JWTs the RetroTrade backend issues to browsers.
//!
//! ## Modules
//!
//! - `jwt`: claims layout, decoding/validation (the service's
//!   `IdentityVerifier`), and token minting for tests and tooling

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
