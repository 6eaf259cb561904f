//! Repository for the `message_templates` table.

use notiflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::message_template::{
    CreateMessageTemplate, MessageTemplate, UpdateMessageTemplate,
};

const COLUMNS: &str = "id, environment_id, organization_id, workflow_id, step_type, name, \
    controls, created_at, updated_at";

/// Provides CRUD operations for message templates.
pub struct MessageTemplateRepo;

impl MessageTemplateRepo {
    /// Insert a message template, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateMessageTemplate,
    ) -> Result<MessageTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO message_templates
                (environment_id, organization_id, workflow_id, step_type, name, controls)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MessageTemplate>(&query)
            .bind(input.environment_id)
            .bind(input.organization_id)
            .bind(input.workflow_id)
            .bind(&input.step_type)
            .bind(&input.name)
            .bind(&input.controls)
            .fetch_one(pool)
            .await
    }

    /// All message templates belonging to a workflow.
    pub async fn list_for_workflow(
        pool: &PgPool,
        environment_id: DbId,
        organization_id: DbId,
        workflow_id: DbId,
    ) -> Result<Vec<MessageTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM message_templates
             WHERE workflow_id = $1 AND environment_id = $2 AND organization_id = $3
             ORDER BY id"
        );
        sqlx::query_as::<_, MessageTemplate>(&query)
            .bind(workflow_id)
            .bind(environment_id)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite a message template. Returns `None` if it does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMessageTemplate,
    ) -> Result<Option<MessageTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE message_templates SET step_type = $2, name = $3, controls = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MessageTemplate>(&query)
            .bind(id)
            .bind(&input.step_type)
            .bind(&input.name)
            .bind(&input.controls)
            .fetch_optional(pool)
            .await
    }

    /// Delete specific message templates. Returns the number of rows removed.
    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM message_templates WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every message template of a workflow. Returns the number of rows removed.
    pub async fn delete_for_workflow(
        pool: &PgPool,
        environment_id: DbId,
        organization_id: DbId,
        workflow_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM message_templates
             WHERE workflow_id = $1 AND environment_id = $2 AND organization_id = $3",
        )
        .bind(workflow_id)
        .bind(environment_id)
        .bind(organization_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
