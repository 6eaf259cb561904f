use notiflow_core::types::DbId;
use notiflow_db::models::workflow::WorkflowResponse;
use notiflow_db::DbPool;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::usecases::{ensure_environment, find_workflow, load_workflow_response};

/// Fetch one workflow with its steps, step controls, and preferences.
pub struct GetWorkflow;

impl GetWorkflow {
    pub async fn execute(
        pool: &DbPool,
        user: &AuthUser,
        workflow_id: DbId,
    ) -> AppResult<WorkflowResponse> {
        ensure_environment(pool, user).await?;
        let workflow = find_workflow(pool, user, workflow_id).await?;
        load_workflow_response(pool, &workflow).await
    }
}
