//! Workflow models and DTOs.
//!
//! Defines the database row struct for `notification_templates`, the
//! internal create/update inputs used by the repository, and the request and
//! response shapes used by the API layer.

use notiflow_core::controls::ControlsSchema;
use notiflow_core::preferences::WorkflowChannelPreferences;
use notiflow_core::reconcile::StepIdentity;
use notiflow_core::types::{DbId, Timestamp};
use notiflow_core::workflow::{StepType, WorkflowOrigin};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A workflow row from the `notification_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Workflow {
    pub id: DbId,
    pub environment_id: DbId,
    pub organization_id: DbId,
    pub notification_group_id: DbId,
    pub name: String,
    pub trigger_identifier: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub active: bool,
    pub draft: bool,
    pub critical: bool,
    pub origin: Option<String>,
    pub workflow_type: String,
    pub payload_schema: Value,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Create / update inputs (internal, used by repository)
// ---------------------------------------------------------------------------

/// Input for inserting a workflow row.
#[derive(Debug, Clone)]
pub struct CreateWorkflow {
    pub environment_id: DbId,
    pub organization_id: DbId,
    pub notification_group_id: DbId,
    pub name: String,
    pub trigger_identifier: String,
    pub description: String,
    pub tags: Vec<String>,
    pub active: bool,
    pub critical: bool,
    pub origin: Option<WorkflowOrigin>,
    pub workflow_type: String,
    pub created_by: Option<DbId>,
}

/// Input for overwriting a workflow row. `None` keeps the stored value.
#[derive(Debug, Clone)]
pub struct UpdateWorkflow {
    pub name: String,
    pub trigger_identifier: String,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub active: bool,
    pub critical: Option<bool>,
    pub origin: Option<WorkflowOrigin>,
    pub workflow_type: String,
}

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

/// One step in a create/update payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StepDto {
    /// Identity of an existing step; omit for new steps.
    #[serde(default)]
    pub step_uuid: Option<DbId>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    #[serde(default)]
    pub controls: Option<ControlsSchema>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub should_stop_on_fail: bool,
    #[serde(default)]
    pub control_values: Option<Map<String, Value>>,
}

impl StepIdentity for StepDto {
    fn step_uuid(&self) -> Option<DbId> {
        self.step_uuid
    }

    fn step_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Request body for creating or updating a workflow.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertWorkflowDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(max = 16))]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub critical: Option<bool>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub notification_group_id: Option<DbId>,
    #[serde(default)]
    pub preferences: Option<WorkflowChannelPreferences>,
    #[serde(default)]
    #[validate(length(max = 100), nested)]
    pub steps: Vec<StepDto>,
    #[serde(default)]
    pub origin: Option<WorkflowOrigin>,
}

/// Query parameters for `GET /workflows`.
#[derive(Debug, Deserialize)]
pub struct WorkflowListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Case-insensitive substring filter on the workflow name.
    pub query: Option<String>,
}

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

/// A step as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct StepResponse {
    pub step_uuid: Option<DbId>,
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls: Option<ControlsSchema>,
    pub active: bool,
    pub should_stop_on_fail: bool,
    pub control_values: Map<String, Value>,
}

/// A fully assembled workflow as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResponse {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub active: bool,
    pub critical: bool,
    pub notification_group_id: DbId,
    pub origin: WorkflowOrigin,
    pub preferences: Option<WorkflowChannelPreferences>,
    pub steps: Vec<StepResponse>,
    /// RFC 3339 timestamp, or a sentinel when the row has none.
    pub updated_at: String,
}

/// Workflow summary used in list responses.
#[derive(Debug, Clone, Serialize)]
pub struct MinifiedWorkflow {
    pub id: DbId,
    pub name: String,
    pub tags: Vec<String>,
    pub updated_at: String,
    pub step_type_overviews: Vec<StepType>,
}

/// Response body for `GET /workflows`.
#[derive(Debug, Clone, Serialize)]
pub struct ListWorkflowResponse {
    pub workflow_summaries: Vec<MinifiedWorkflow>,
    pub total_results: i64,
}
