//! Read and replace workflow preferences.
//!
//! Documents are replaced wholesale. On read, the caller's own document is
//! resolved against the workflow defaults.

use notiflow_core::preferences::{resolve_effective, PreferenceType, WorkflowChannelPreferences};
use notiflow_core::types::DbId;
use notiflow_db::models::preferences::{
    Preferences, PreferencesPayload, UpsertPreferencesDto, WorkflowPreferencesResponse,
};
use notiflow_db::models::workflow::Workflow;
use notiflow_db::repositories::PreferencesRepo;
use notiflow_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::mappers::workflow::legacy_channels_to_preferences;
use crate::middleware::auth::AuthUser;
use crate::usecases::{ensure_environment, find_workflow};

pub struct GetPreferences;

impl GetPreferences {
    pub async fn execute(
        pool: &DbPool,
        user: &AuthUser,
        workflow_id: DbId,
    ) -> AppResult<WorkflowPreferencesResponse> {
        ensure_environment(pool, user).await?;
        let workflow = find_workflow(pool, user, workflow_id).await?;
        load_preferences(pool, user, &workflow).await
    }
}

pub struct UpsertPreferences;

impl UpsertPreferences {
    pub async fn execute(
        pool: &DbPool,
        user: &AuthUser,
        workflow_id: DbId,
        dto: UpsertPreferencesDto,
    ) -> AppResult<WorkflowPreferencesResponse> {
        ensure_environment(pool, user).await?;
        let workflow = find_workflow(pool, user, workflow_id).await?;

        let document = match dto.preferences {
            PreferencesPayload::Document(document) => document,
            PreferencesPayload::Legacy(flags) => legacy_channels_to_preferences(flags),
        };

        match dto.preference_type {
            PreferenceType::WorkflowResource => {
                PreferencesRepo::upsert_workflow_preferences(
                    pool,
                    workflow.environment_id,
                    workflow.organization_id,
                    workflow.id,
                    &document,
                )
                .await?;
            }
            PreferenceType::UserWorkflow => {
                PreferencesRepo::upsert_user_preferences(
                    pool,
                    workflow.environment_id,
                    workflow.organization_id,
                    workflow.id,
                    user.user_id,
                    &document,
                )
                .await?;
            }
        }

        tracing::info!(
            workflow_id = workflow.id,
            user_id = user.user_id,
            preference_type = %dto.preference_type,
            "Preferences replaced",
        );

        load_preferences(pool, user, &workflow).await
    }
}

async fn load_preferences(
    pool: &DbPool,
    user: &AuthUser,
    workflow: &Workflow,
) -> AppResult<WorkflowPreferencesResponse> {
    let workflow_preferences = parse(
        PreferencesRepo::find_workflow_preferences(
            pool,
            workflow.environment_id,
            workflow.organization_id,
            workflow.id,
        )
        .await?,
    )?;
    let user_preferences = parse(
        PreferencesRepo::find_user_preferences(
            pool,
            workflow.environment_id,
            workflow.organization_id,
            workflow.id,
            user.user_id,
        )
        .await?,
    )?;

    Ok(WorkflowPreferencesResponse {
        workflow_id: workflow.id,
        workflow_preferences,
        user_preferences,
        effective: resolve_effective(workflow_preferences, user_preferences),
    })
}

fn parse(row: Option<Preferences>) -> AppResult<Option<WorkflowChannelPreferences>> {
    row.map(|p| p.document())
        .transpose()
        .map_err(|e| AppError::InternalError(format!("Stored preferences are malformed: {e}")))
}
