//! notiflow API server library.
//!
//! Exposes the building blocks (config, state, error handling, auth, use-cases,
//! routes) so integration tests and the binary entrypoint can both access them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mappers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod usecases;
