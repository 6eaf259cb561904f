pub mod auth;
pub mod preferences;
pub mod workflows;
