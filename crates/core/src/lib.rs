//! Domain logic shared by the database and API crates.
//!
//! Nothing in this crate touches the database or HTTP; everything here is
//! pure and unit-tested in place.

pub mod controls;
pub mod error;
pub mod preferences;
pub mod reconcile;
pub mod search;
pub mod types;
pub mod workflow;
