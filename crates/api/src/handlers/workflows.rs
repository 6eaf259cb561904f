//! Handlers for the `/workflows` resource.
//!
//! All endpoints require authentication and operate within the caller's
//! environment and organization.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use notiflow_core::types::DbId;
use notiflow_db::models::workflow::{UpsertWorkflowDto, WorkflowListParams};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::usecases::{
    DeleteWorkflow, GetWorkflow, ListWorkflows, UpsertWorkflow, UpsertWorkflowCommand,
};

/// GET /api/v1/workflows
pub async fn list_workflows(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<WorkflowListParams>,
) -> AppResult<impl IntoResponse> {
    let page = ListWorkflows::execute(&state.pool, &auth, &params).await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/workflows
pub async fn create_workflow(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpsertWorkflowDto>,
) -> AppResult<impl IntoResponse> {
    let workflow = UpsertWorkflow::execute(
        &state.pool,
        state.config.unmatched_step_policy,
        UpsertWorkflowCommand {
            user: auth,
            workflow_id_for_update: None,
            workflow: input,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: workflow })))
}

/// GET /api/v1/workflows/{id}
pub async fn get_workflow(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let workflow = GetWorkflow::execute(&state.pool, &auth, workflow_id).await?;
    Ok(Json(DataResponse { data: workflow }))
}

/// PUT /api/v1/workflows/{id}
///
/// Overwrite a workflow and reconcile its steps.
pub async fn update_workflow(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
    Json(input): Json<UpsertWorkflowDto>,
) -> AppResult<impl IntoResponse> {
    let workflow = UpsertWorkflow::execute(
        &state.pool,
        state.config.unmatched_step_policy,
        UpsertWorkflowCommand {
            user: auth,
            workflow_id_for_update: Some(workflow_id),
            workflow: input,
        },
    )
    .await?;

    Ok(Json(DataResponse { data: workflow }))
}

/// DELETE /api/v1/workflows/{id}
pub async fn delete_workflow(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    DeleteWorkflow::execute(&state.pool, &auth, workflow_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
