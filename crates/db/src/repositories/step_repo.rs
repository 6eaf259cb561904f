//! Repository for the `notification_steps` table.

use notiflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::step::{CreateStep, NotificationStep, UpdateStep};

const COLUMNS: &str = "id, workflow_id, template_id, step_id, name, position, \
    should_stop_on_fail, active, control_variables, created_at, updated_at";

/// Provides CRUD operations for workflow steps.
pub struct StepRepo;

impl StepRepo {
    /// Insert a step row, returning it.
    pub async fn create(
        pool: &PgPool,
        input: &CreateStep,
    ) -> Result<NotificationStep, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_steps
                (workflow_id, template_id, step_id, name, position, should_stop_on_fail, active)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationStep>(&query)
            .bind(input.workflow_id)
            .bind(input.template_id)
            .bind(&input.step_id)
            .bind(&input.name)
            .bind(input.position)
            .bind(input.should_stop_on_fail)
            .bind(input.active)
            .fetch_one(pool)
            .await
    }

    /// All steps of a workflow in execution order.
    pub async fn list_for_workflow(
        pool: &PgPool,
        workflow_id: DbId,
    ) -> Result<Vec<NotificationStep>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_steps
             WHERE workflow_id = $1
             ORDER BY position, id"
        );
        sqlx::query_as::<_, NotificationStep>(&query)
            .bind(workflow_id)
            .fetch_all(pool)
            .await
    }

    /// Overwrite a step row. Returns `None` if the step does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStep,
    ) -> Result<Option<NotificationStep>, sqlx::Error> {
        let query = format!(
            "UPDATE notification_steps SET
                step_id = $2,
                name = $3,
                position = $4,
                should_stop_on_fail = $5,
                active = $6
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationStep>(&query)
            .bind(id)
            .bind(&input.step_id)
            .bind(&input.name)
            .bind(input.position)
            .bind(input.should_stop_on_fail)
            .bind(input.active)
            .fetch_optional(pool)
            .await
    }

    /// Delete the given steps. Returns the number of rows removed.
    pub async fn delete_many(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM notification_steps WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
