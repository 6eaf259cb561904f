//! Repository for the `control_values` table.

use notiflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::control_values::{ControlValues, ControlValuesKey, CreateControlValues};

const COLUMNS: &str = "id, environment_id, organization_id, workflow_id, step_id, level, \
    priority, controls, inputs, created_at, updated_at";

/// Provides CRUD operations for stored control values.
pub struct ControlValuesRepo;

impl ControlValuesRepo {
    /// Find the first record for a key, oldest first.
    pub async fn find_first(
        pool: &PgPool,
        key: &ControlValuesKey,
    ) -> Result<Option<ControlValues>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM control_values
             WHERE environment_id = $1 AND organization_id = $2
               AND workflow_id = $3 AND step_id = $4 AND level = $5
             ORDER BY id
             LIMIT 1"
        );
        sqlx::query_as::<_, ControlValues>(&query)
            .bind(key.environment_id)
            .bind(key.organization_id)
            .bind(key.workflow_id)
            .bind(key.step_id)
            .bind(key.level.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Insert a record, returning it.
    pub async fn create(
        pool: &PgPool,
        input: &CreateControlValues,
    ) -> Result<ControlValues, sqlx::Error> {
        let query = format!(
            "INSERT INTO control_values
                (environment_id, organization_id, workflow_id, step_id, level,
                 priority, controls, inputs)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ControlValues>(&query)
            .bind(input.key.environment_id)
            .bind(input.key.organization_id)
            .bind(input.key.workflow_id)
            .bind(input.key.step_id)
            .bind(input.key.level.as_str())
            .bind(input.priority)
            .bind(&input.controls)
            .bind(&input.inputs)
            .fetch_one(pool)
            .await
    }

    /// Overwrite the values of an existing record within an organization.
    ///
    /// Returns `None` if the record no longer exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
        priority: i32,
        controls: &serde_json::Value,
        inputs: &serde_json::Value,
    ) -> Result<Option<ControlValues>, sqlx::Error> {
        let query = format!(
            "UPDATE control_values SET priority = $3, controls = $4, inputs = $5
             WHERE id = $1 AND organization_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ControlValues>(&query)
            .bind(id)
            .bind(organization_id)
            .bind(priority)
            .bind(controls)
            .bind(inputs)
            .fetch_optional(pool)
            .await
    }

    /// Delete the records of a workflow, or of one of its steps when
    /// `step_id` is given. Returns the number of rows removed.
    pub async fn delete_many(
        pool: &PgPool,
        environment_id: DbId,
        organization_id: DbId,
        workflow_id: DbId,
        step_id: Option<DbId>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM control_values
             WHERE environment_id = $1 AND organization_id = $2 AND workflow_id = $3
               AND ($4::BIGINT IS NULL OR step_id = $4)",
        )
        .bind(environment_id)
        .bind(organization_id)
        .bind(workflow_id)
        .bind(step_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Count the records stored for a workflow.
    pub async fn count_for_workflow(
        pool: &PgPool,
        environment_id: DbId,
        organization_id: DbId,
        workflow_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM control_values
             WHERE environment_id = $1 AND organization_id = $2 AND workflow_id = $3",
        )
        .bind(environment_id)
        .bind(organization_id)
        .bind(workflow_id)
        .fetch_one(pool)
        .await
    }
}
