//! Workflow step model and DTOs.

use notiflow_core::reconcile::StepIdentity;
use notiflow_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notification_steps` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationStep {
    pub id: DbId,
    pub workflow_id: DbId,
    /// The step's message template; exposed to clients as `step_uuid`.
    pub template_id: Option<DbId>,
    /// The trimmed step name.
    pub step_id: Option<String>,
    pub name: Option<String>,
    pub position: i32,
    pub should_stop_on_fail: bool,
    pub active: bool,
    pub control_variables: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StepIdentity for NotificationStep {
    fn step_uuid(&self) -> Option<DbId> {
        self.template_id
    }

    fn step_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Input for inserting a step row.
#[derive(Debug, Clone)]
pub struct CreateStep {
    pub workflow_id: DbId,
    pub template_id: DbId,
    pub step_id: String,
    pub name: String,
    pub position: i32,
    pub should_stop_on_fail: bool,
    pub active: bool,
}

/// Input for overwriting an existing step row.
#[derive(Debug, Clone)]
pub struct UpdateStep {
    pub step_id: String,
    pub name: String,
    pub position: i32,
    pub should_stop_on_fail: bool,
    pub active: bool,
}
