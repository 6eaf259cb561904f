//! Environment entity model and DTOs.

use notiflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `environments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Environment {
    pub id: DbId,
    pub organization_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an environment.
#[derive(Debug, Deserialize)]
pub struct CreateEnvironment {
    pub organization_id: DbId,
    pub name: String,
}
