//! Repository for the `notification_templates` (workflows) table.
//!
//! Every lookup except [`WorkflowRepo::find_by_trigger_identifier`] is scoped
//! by both `environment_id` and `organization_id`.

use notiflow_core::search::contains_pattern;
use notiflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::workflow::{CreateWorkflow, UpdateWorkflow, Workflow};

/// Column list for workflow queries.
const COLUMNS: &str = "id, environment_id, organization_id, notification_group_id, name, \
    trigger_identifier, description, tags, active, draft, critical, origin, workflow_type, \
    payload_schema, created_by, created_at, updated_at";

/// Provides CRUD operations for workflows.
pub struct WorkflowRepo;

impl WorkflowRepo {
    /// Insert a new workflow, returning the created row.
    ///
    /// `draft` is always the inverse of `active`.
    pub async fn create(pool: &PgPool, input: &CreateWorkflow) -> Result<Workflow, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_templates
                (environment_id, organization_id, notification_group_id, name,
                 trigger_identifier, description, tags, active, draft, critical,
                 origin, workflow_type, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOT $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(input.environment_id)
            .bind(input.organization_id)
            .bind(input.notification_group_id)
            .bind(&input.name)
            .bind(&input.trigger_identifier)
            .bind(&input.description)
            .bind(&input.tags)
            .bind(input.active)
            .bind(input.critical)
            .bind(input.origin.map(|o| o.as_str()))
            .bind(&input.workflow_type)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a workflow by id within an environment and organization.
    pub async fn find_by_id(
        pool: &PgPool,
        environment_id: DbId,
        organization_id: DbId,
        id: DbId,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_templates
             WHERE id = $1 AND environment_id = $2 AND organization_id = $3"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .bind(environment_id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a workflow by trigger identifier within an environment.
    pub async fn find_by_trigger_identifier(
        pool: &PgPool,
        environment_id: DbId,
        trigger_identifier: &str,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_templates
             WHERE environment_id = $1 AND trigger_identifier = $2"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(environment_id)
            .bind(trigger_identifier)
            .fetch_optional(pool)
            .await
    }

    /// List workflows, newest first, with an optional name filter.
    pub async fn list(
        pool: &PgPool,
        environment_id: DbId,
        organization_id: DbId,
        name_query: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Workflow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_templates
             WHERE environment_id = $1 AND organization_id = $2
               AND ($3::TEXT IS NULL OR name ILIKE $3 ESCAPE '\\')
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(environment_id)
            .bind(organization_id)
            .bind(name_query.map(contains_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count workflows matching the same filter as [`WorkflowRepo::list`].
    pub async fn count(
        pool: &PgPool,
        environment_id: DbId,
        organization_id: DbId,
        name_query: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notification_templates
             WHERE environment_id = $1 AND organization_id = $2
               AND ($3::TEXT IS NULL OR name ILIKE $3 ESCAPE '\\')",
        )
        .bind(environment_id)
        .bind(organization_id)
        .bind(name_query.map(contains_pattern))
        .fetch_one(pool)
        .await
    }

    /// Overwrite a workflow, returning the updated row.
    ///
    /// `description`, `tags`, and `critical` keep their stored values when
    /// `None`. Returns `None` if no row matches the scope.
    pub async fn update(
        pool: &PgPool,
        environment_id: DbId,
        organization_id: DbId,
        id: DbId,
        input: &UpdateWorkflow,
    ) -> Result<Option<Workflow>, sqlx::Error> {
        let query = format!(
            "UPDATE notification_templates SET
                name = $4,
                trigger_identifier = $5,
                description = COALESCE($6, description),
                tags = COALESCE($7, tags),
                active = $8,
                draft = NOT $8,
                critical = COALESCE($9, critical),
                origin = COALESCE($10, origin),
                workflow_type = $11
             WHERE id = $1 AND environment_id = $2 AND organization_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workflow>(&query)
            .bind(id)
            .bind(environment_id)
            .bind(organization_id)
            .bind(&input.name)
            .bind(&input.trigger_identifier)
            .bind(&input.description)
            .bind(&input.tags)
            .bind(input.active)
            .bind(input.critical)
            .bind(input.origin.map(|o| o.as_str()))
            .bind(&input.workflow_type)
            .fetch_optional(pool)
            .await
    }

    /// Delete a workflow. Steps and preferences cascade.
    /// Returns `true` if a row was removed.
    pub async fn delete(
        pool: &PgPool,
        environment_id: DbId,
        organization_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM notification_templates
             WHERE id = $1 AND environment_id = $2 AND organization_id = $3",
        )
        .bind(id)
        .bind(environment_id)
        .bind(organization_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
