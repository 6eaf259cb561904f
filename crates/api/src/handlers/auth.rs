//! Handlers for the `/auth` resource (login, organization switch).

use axum::extract::{Path, State};
use axum::Json;
use notiflow_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::usecases::{
    Login, LoginRequest, LoginResponse, SwitchOrganization, SwitchOrganizationResponse,
};

/// POST /api/v1/auth/login
///
/// Authenticate with email + password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let response = Login::execute(state.auth.as_ref(), &input).await?;
    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/auth/organizations/{id}/switch
///
/// Re-issue the caller's token for another organization.
pub async fn switch_organization(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(organization_id): Path<DbId>,
) -> AppResult<Json<DataResponse<SwitchOrganizationResponse>>> {
    let response = SwitchOrganization::execute(state.auth.as_ref(), &auth, organization_id).await?;
    Ok(Json(DataResponse { data: response }))
}
