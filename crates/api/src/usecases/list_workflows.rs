use std::collections::HashMap;

use notiflow_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use notiflow_core::types::DbId;
use notiflow_db::models::workflow::{ListWorkflowResponse, WorkflowListParams};
use notiflow_db::repositories::{MessageTemplateRepo, StepRepo, WorkflowRepo};
use notiflow_db::DbPool;

use crate::error::AppResult;
use crate::mappers::workflow::{step_type_of, to_minified_workflows};
use crate::middleware::auth::AuthUser;
use crate::usecases::ensure_environment;

/// Page through the caller's workflows, newest first.
pub struct ListWorkflows;

impl ListWorkflows {
    pub async fn execute(
        pool: &DbPool,
        user: &AuthUser,
        params: &WorkflowListParams,
    ) -> AppResult<ListWorkflowResponse> {
        ensure_environment(pool, user).await?;

        let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
        let offset = clamp_offset(params.offset);
        let query = params
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());

        let workflows = WorkflowRepo::list(
            pool,
            user.environment_id,
            user.organization_id,
            query,
            limit,
            offset,
        )
        .await?;
        let total_results =
            WorkflowRepo::count(pool, user.environment_id, user.organization_id, query).await?;

        let mut step_types = HashMap::with_capacity(workflows.len());
        for workflow in &workflows {
            let steps = StepRepo::list_for_workflow(pool, workflow.id).await?;
            let templates: HashMap<DbId, _> = MessageTemplateRepo::list_for_workflow(
                pool,
                user.environment_id,
                user.organization_id,
                workflow.id,
            )
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
            let types = steps
                .iter()
                .map(|s| step_type_of(s.template_id.and_then(|id| templates.get(&id))))
                .collect();
            step_types.insert(workflow.id, types);
        }

        Ok(ListWorkflowResponse {
            workflow_summaries: to_minified_workflows(&workflows, &mut step_types),
            total_results,
        })
    }
}
