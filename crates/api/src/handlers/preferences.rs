//! Handlers for `/workflows/{id}/preferences`.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use notiflow_core::types::DbId;
use notiflow_db::models::preferences::UpsertPreferencesDto;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::usecases::{GetPreferences, UpsertPreferences};

/// GET /api/v1/workflows/{id}/preferences
///
/// Workflow defaults, the caller's overrides, and the resolved result.
pub async fn get_preferences(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let preferences = GetPreferences::execute(&state.pool, &auth, workflow_id).await?;
    Ok(Json(DataResponse { data: preferences }))
}

/// PUT /api/v1/workflows/{id}/preferences
///
/// Replace either the workflow defaults or the caller's overrides.
pub async fn upsert_preferences(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workflow_id): Path<DbId>,
    Json(input): Json<UpsertPreferencesDto>,
) -> AppResult<impl IntoResponse> {
    let preferences = UpsertPreferences::execute(&state.pool, &auth, workflow_id, input).await?;
    Ok(Json(DataResponse { data: preferences }))
}
