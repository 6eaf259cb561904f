//! Message template models and DTOs.
//!
//! A message template holds a step's channel type and control schema. Its id
//! is the step's stable identity (`step_uuid`).

use notiflow_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `message_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageTemplate {
    pub id: DbId,
    pub environment_id: DbId,
    pub organization_id: DbId,
    pub workflow_id: DbId,
    pub step_type: String,
    pub name: Option<String>,
    /// JSON Schema for the step's controls, if the step declares one.
    pub controls: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a message template.
#[derive(Debug, Clone)]
pub struct CreateMessageTemplate {
    pub environment_id: DbId,
    pub organization_id: DbId,
    pub workflow_id: DbId,
    pub step_type: String,
    pub name: Option<String>,
    pub controls: Option<serde_json::Value>,
}

/// Input for overwriting a message template during a workflow update.
#[derive(Debug, Clone)]
pub struct UpdateMessageTemplate {
    pub step_type: String,
    pub name: Option<String>,
    pub controls: Option<serde_json::Value>,
}
