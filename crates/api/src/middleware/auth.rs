//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use notiflow_core::error::CoreError;
use notiflow_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller extracted from the `Authorization` header.
///
/// Carries the organization and environment the token is scoped to; every
/// workflow operation is confined to that pair.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub organization_id: DbId,
    pub environment_id: DbId,
    pub roles: Vec<String>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = state.auth.verify_token(token)?;

        Ok(AuthUser {
            user_id: claims.sub,
            organization_id: claims.organization_id,
            environment_id: claims.environment_id,
            roles: claims.roles,
        })
    }
}
