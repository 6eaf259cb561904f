//! Control-values model and DTOs.

use notiflow_core::types::{DbId, Timestamp};
use notiflow_core::workflow::ControlValuesLevel;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `control_values` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ControlValues {
    pub id: DbId,
    pub environment_id: DbId,
    pub organization_id: DbId,
    pub workflow_id: DbId,
    /// Message template id of the step the values belong to.
    pub step_id: DbId,
    pub level: String,
    pub priority: i32,
    pub controls: serde_json::Value,
    pub inputs: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Lookup key for a single control-values record.
#[derive(Debug, Clone, Copy)]
pub struct ControlValuesKey {
    pub environment_id: DbId,
    pub organization_id: DbId,
    pub workflow_id: DbId,
    pub step_id: DbId,
    pub level: ControlValuesLevel,
}

/// Input for creating a control-values record.
#[derive(Debug, Clone)]
pub struct CreateControlValues {
    pub key: ControlValuesKey,
    pub priority: i32,
    pub controls: serde_json::Value,
    pub inputs: serde_json::Value,
}
