//! Use-cases: one struct per operation.
//!
//! Handlers translate requests into calls on these; integration tests call
//! them directly. Every operation validates the caller's environment before
//! touching workflow data and scopes all reads and writes by the caller's
//! `(environment_id, organization_id)`.

pub mod delete_workflow;
pub mod get_workflow;
pub mod list_workflows;
pub mod login;
pub mod preferences;
pub mod switch_organization;
pub mod upsert_control_values;
pub mod upsert_workflow;

use std::collections::HashMap;

use notiflow_core::error::CoreError;
use notiflow_core::types::DbId;
use notiflow_core::workflow::ControlValuesLevel;
use notiflow_db::models::control_values::ControlValuesKey;
use notiflow_db::models::environment::Environment;
use notiflow_db::models::workflow::{Workflow, WorkflowResponse};
use notiflow_db::repositories::{
    ControlValuesRepo, EnvironmentRepo, MessageTemplateRepo, PreferencesRepo, StepRepo,
    WorkflowRepo,
};
use notiflow_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::mappers::workflow::{to_workflow_response, WorkflowParts};
use crate::middleware::auth::AuthUser;

pub use delete_workflow::{DeleteWorkflow, DeleteWorkflowOutcome};
pub use get_workflow::GetWorkflow;
pub use list_workflows::ListWorkflows;
pub use login::{Login, LoginRequest, LoginResponse};
pub use preferences::{GetPreferences, UpsertPreferences};
pub use switch_organization::{SwitchOrganization, SwitchOrganizationResponse};
pub use upsert_control_values::{UpsertControlValues, UpsertControlValuesCommand};
pub use upsert_workflow::{UpsertWorkflow, UpsertWorkflowCommand};

/// Load the caller's environment, rejecting environments that do not exist
/// or belong to another organization.
pub(crate) async fn ensure_environment(pool: &DbPool, user: &AuthUser) -> AppResult<Environment> {
    EnvironmentRepo::find_by_id(pool, user.environment_id)
        .await?
        .filter(|env| env.organization_id == user.organization_id)
        .ok_or_else(|| AppError::Core(CoreError::BadRequest("Environment not found".into())))
}

/// Load a workflow within the caller's scope or fail with not found.
pub(crate) async fn find_workflow(
    pool: &DbPool,
    user: &AuthUser,
    workflow_id: DbId,
) -> AppResult<Workflow> {
    WorkflowRepo::find_by_id(pool, user.environment_id, user.organization_id, workflow_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workflow",
            id: workflow_id,
        }))
}

/// Assemble the full response for a persisted workflow: steps, their
/// message templates, stored step controls, and workflow preferences.
pub(crate) async fn load_workflow_response(
    pool: &DbPool,
    workflow: &Workflow,
) -> AppResult<WorkflowResponse> {
    let steps = StepRepo::list_for_workflow(pool, workflow.id).await?;

    let templates: HashMap<DbId, _> = MessageTemplateRepo::list_for_workflow(
        pool,
        workflow.environment_id,
        workflow.organization_id,
        workflow.id,
    )
    .await?
    .into_iter()
    .map(|t| (t.id, t))
    .collect();

    let mut control_values = HashMap::new();
    for step_uuid in steps.iter().filter_map(|s| s.template_id) {
        let key = ControlValuesKey {
            environment_id: workflow.environment_id,
            organization_id: workflow.organization_id,
            workflow_id: workflow.id,
            step_id: step_uuid,
            level: ControlValuesLevel::StepControls,
        };
        if let Some(record) = ControlValuesRepo::find_first(pool, &key).await? {
            control_values.insert(step_uuid, record.controls);
        }
    }

    let preferences = PreferencesRepo::find_workflow_preferences(
        pool,
        workflow.environment_id,
        workflow.organization_id,
        workflow.id,
    )
    .await?
    .map(|p| p.document())
    .transpose()
    .map_err(|e| AppError::InternalError(format!("Stored preferences are malformed: {e}")))?;

    Ok(to_workflow_response(WorkflowParts {
        workflow,
        steps: &steps,
        templates: &templates,
        control_values: &control_values,
        preferences,
    }))
}
