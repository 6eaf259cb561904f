//! Repository for the `environments` table.

use notiflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::environment::{CreateEnvironment, Environment};

const COLUMNS: &str = "id, organization_id, name, created_at, updated_at";

/// Provides CRUD operations for environments.
pub struct EnvironmentRepo;

impl EnvironmentRepo {
    /// Insert a new environment, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateEnvironment,
    ) -> Result<Environment, sqlx::Error> {
        let query = format!(
            "INSERT INTO environments (organization_id, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Environment>(&query)
            .bind(input.organization_id)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find an environment by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Environment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM environments WHERE id = $1");
        sqlx::query_as::<_, Environment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The first environment created for an organization (its development
    /// environment), if any.
    pub async fn find_first_for_organization(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Option<Environment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM environments WHERE organization_id = $1 ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, Environment>(&query)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }
}
