//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the caller identity decoded from a Bearer token.

pub mod auth;
