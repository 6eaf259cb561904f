use notiflow_core::error::CoreError;
use notiflow_core::types::DbId;
use notiflow_db::models::user::UserResponse;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::TokenScope;
use crate::auth::password::verify_password;
use crate::auth::provider::AuthProvider;
use crate::error::{AppError, AppResult};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub organization_id: DbId,
    pub environment_id: DbId,
    pub user: UserResponse,
}

/// Exchange email and password for a token scoped to the user's first
/// organization and its development environment.
pub struct Login;

impl Login {
    pub async fn execute(
        provider: &dyn AuthProvider,
        request: &LoginRequest,
    ) -> AppResult<LoginResponse> {
        let user = provider
            .find_user_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

        let password_valid = verify_password(&request.password, &user.password_hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
        if !password_valid {
            return Err(AppError::Core(CoreError::Unauthorized(
                INVALID_CREDENTIALS.into(),
            )));
        }

        let organization = provider
            .list_user_organizations(user.id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::Core(CoreError::Forbidden(
                    "User does not belong to any organization".into(),
                ))
            })?;

        let member = provider
            .find_member(organization.id, user.id)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::BadRequest("Member not found".into())))?;

        let environment = provider
            .find_development_environment(organization.id)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::BadRequest("Environment not found".into())))?;

        let access_token = provider.sign_token(&TokenScope {
            user_id: user.id,
            organization_id: organization.id,
            environment_id: environment.id,
            roles: member.roles,
        })?;

        tracing::info!(user_id = user.id, organization_id = organization.id, "User logged in");

        Ok(LoginResponse {
            access_token,
            expires_in: provider.token_ttl_secs(),
            organization_id: organization.id,
            environment_id: environment.id,
            user: UserResponse::from(&user),
        })
    }
}
