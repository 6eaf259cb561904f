//! Pure conversions from persisted entities to response DTOs.

pub mod workflow;
