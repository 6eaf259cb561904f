use notiflow_core::error::CoreError;
use notiflow_core::types::DbId;
use serde::Serialize;

use crate::auth::jwt::TokenScope;
use crate::auth::provider::AuthProvider;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// A token re-scoped to another organization.
#[derive(Debug, Serialize)]
pub struct SwitchOrganizationResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub organization_id: DbId,
    pub environment_id: DbId,
}

/// Issue a token for another organization the caller belongs to.
pub struct SwitchOrganization;

impl SwitchOrganization {
    pub async fn execute(
        provider: &dyn AuthProvider,
        user: &AuthUser,
        organization_id: DbId,
    ) -> AppResult<SwitchOrganizationResponse> {
        if !provider
            .is_authenticated_for_organization(user.user_id, organization_id)
            .await?
        {
            return Err(AppError::Core(CoreError::Unauthorized(format!(
                "Not authorized for organization {organization_id}"
            ))));
        }

        let member = provider
            .find_member(organization_id, user.user_id)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::BadRequest("Member not found".into())))?;

        let account = provider.find_user(user.user_id).await?.ok_or_else(|| {
            AppError::Core(CoreError::BadRequest(format!(
                "User {} not found",
                user.user_id
            )))
        })?;

        let environment = provider
            .find_development_environment(organization_id)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::BadRequest("Environment not found".into())))?;

        let access_token = provider.sign_token(&TokenScope {
            user_id: account.id,
            organization_id,
            environment_id: environment.id,
            roles: member.roles,
        })?;

        tracing::info!(
            user_id = account.id,
            organization_id,
            environment_id = environment.id,
            "Switched organization",
        );

        Ok(SwitchOrganizationResponse {
            access_token,
            expires_in: provider.token_ttl_secs(),
            organization_id,
            environment_id: environment.id,
        })
    }
}
