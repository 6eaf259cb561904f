use notiflow_core::types::DbId;
use notiflow_db::repositories::{ControlValuesRepo, MessageTemplateRepo, StepRepo, WorkflowRepo};
use notiflow_db::DbPool;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::usecases::{ensure_environment, find_workflow};

/// What a workflow delete removed.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteWorkflowOutcome {
    pub workflow_id: DbId,
    pub steps_removed: usize,
    /// `None` when the workflow had no steps and the delete was not issued.
    pub message_templates_deleted: Option<u64>,
    pub control_values_deleted: u64,
}

/// Delete a workflow together with its message templates and control values.
///
/// The deletes run as independent statements; a failure partway leaves the
/// remaining rows in place.
pub struct DeleteWorkflow;

impl DeleteWorkflow {
    pub async fn execute(
        pool: &DbPool,
        user: &AuthUser,
        workflow_id: DbId,
    ) -> AppResult<DeleteWorkflowOutcome> {
        ensure_environment(pool, user).await?;
        let workflow = find_workflow(pool, user, workflow_id).await?;
        let steps = StepRepo::list_for_workflow(pool, workflow.id).await?;

        WorkflowRepo::delete(pool, user.environment_id, user.organization_id, workflow.id).await?;

        let message_templates_deleted = if steps.is_empty() {
            None
        } else {
            Some(
                MessageTemplateRepo::delete_for_workflow(
                    pool,
                    user.environment_id,
                    user.organization_id,
                    workflow.id,
                )
                .await?,
            )
        };

        let control_values_deleted = ControlValuesRepo::delete_many(
            pool,
            user.environment_id,
            user.organization_id,
            workflow.id,
            None,
        )
        .await?;

        tracing::info!(
            workflow_id = workflow.id,
            user_id = user.user_id,
            steps = steps.len(),
            control_values_deleted,
            "Workflow deleted",
        );

        Ok(DeleteWorkflowOutcome {
            workflow_id: workflow.id,
            steps_removed: steps.len(),
            message_templates_deleted,
            control_values_deleted,
        })
    }
}
