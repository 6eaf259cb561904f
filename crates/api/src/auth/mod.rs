//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- HS256 access-token generation and validation.
//! - [`provider`] -- the pluggable [`provider::AuthProvider`] and its registry.

pub mod jwt;
pub mod password;
pub mod provider;
