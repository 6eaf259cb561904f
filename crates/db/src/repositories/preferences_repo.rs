//! Repository for the `preferences` table.
//!
//! Documents are replaced wholesale on every write. The partial unique
//! indexes keep one workflow-level document per workflow and one user-level
//! document per (workflow, user).

use notiflow_core::preferences::{PreferenceType, WorkflowChannelPreferences};
use notiflow_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::preferences::Preferences;

const COLUMNS: &str = "id, environment_id, organization_id, workflow_id, user_id, \
    preference_type, preferences, created_at, updated_at";

/// Provides read and upsert operations for preferences documents.
pub struct PreferencesRepo;

impl PreferencesRepo {
    /// Replace the workflow-level document, creating it if missing.
    pub async fn upsert_workflow_preferences(
        pool: &PgPool,
        environment_id: DbId,
        organization_id: DbId,
        workflow_id: DbId,
        preferences: &WorkflowChannelPreferences,
    ) -> Result<Preferences, sqlx::Error> {
        let query = format!(
            "INSERT INTO preferences
                (environment_id, organization_id, workflow_id, preference_type, preferences)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (workflow_id) WHERE preference_type = 'workflow_resource'
             DO UPDATE SET preferences = EXCLUDED.preferences
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Preferences>(&query)
            .bind(environment_id)
            .bind(organization_id)
            .bind(workflow_id)
            .bind(PreferenceType::WorkflowResource.as_str())
            .bind(Json(preferences))
            .fetch_one(pool)
            .await
    }

    /// Replace a user's document for a workflow, creating it if missing.
    pub async fn upsert_user_preferences(
        pool: &PgPool,
        environment_id: DbId,
        organization_id: DbId,
        workflow_id: DbId,
        user_id: DbId,
        preferences: &WorkflowChannelPreferences,
    ) -> Result<Preferences, sqlx::Error> {
        let query = format!(
            "INSERT INTO preferences
                (environment_id, organization_id, workflow_id, user_id, preference_type, preferences)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (workflow_id, user_id) WHERE preference_type = 'user_workflow'
             DO UPDATE SET preferences = EXCLUDED.preferences
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Preferences>(&query)
            .bind(environment_id)
            .bind(organization_id)
            .bind(workflow_id)
            .bind(user_id)
            .bind(PreferenceType::UserWorkflow.as_str())
            .bind(Json(preferences))
            .fetch_one(pool)
            .await
    }

    /// Find the workflow-level document.
    pub async fn find_workflow_preferences(
        pool: &PgPool,
        environment_id: DbId,
        organization_id: DbId,
        workflow_id: DbId,
    ) -> Result<Option<Preferences>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM preferences
             WHERE environment_id = $1 AND organization_id = $2 AND workflow_id = $3
               AND preference_type = 'workflow_resource'"
        );
        sqlx::query_as::<_, Preferences>(&query)
            .bind(environment_id)
            .bind(organization_id)
            .bind(workflow_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user's document for a workflow.
    pub async fn find_user_preferences(
        pool: &PgPool,
        environment_id: DbId,
        organization_id: DbId,
        workflow_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Preferences>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM preferences
             WHERE environment_id = $1 AND organization_id = $2 AND workflow_id = $3
               AND user_id = $4 AND preference_type = 'user_workflow'"
        );
        sqlx::query_as::<_, Preferences>(&query)
            .bind(environment_id)
            .bind(organization_id)
            .bind(workflow_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
