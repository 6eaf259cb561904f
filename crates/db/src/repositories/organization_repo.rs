//! Repository for the `organizations` table.

use notiflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::organization::{CreateOrganization, Organization};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for organizations.
pub struct OrganizationRepo;

impl OrganizationRepo {
    /// Insert a new organization, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOrganization,
    ) -> Result<Organization, sqlx::Error> {
        let query = format!("INSERT INTO organizations (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Organization>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find an organization by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE id = $1");
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the organizations a user is an active member of, oldest membership first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Organization>, sqlx::Error> {
        let query = "SELECT o.id, o.name, o.created_at, o.updated_at \
             FROM organizations o \
             JOIN members m ON m.organization_id = o.id \
             WHERE m.user_id = $1 AND m.member_status = 'active' \
             ORDER BY m.id";
        sqlx::query_as::<_, Organization>(query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
