//! Repository for the `members` table.

use notiflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::member::{CreateMember, Member};

const COLUMNS: &str =
    "id, organization_id, user_id, roles, member_status, created_at, updated_at";

/// Provides CRUD operations for organization memberships.
pub struct MemberRepo;

impl MemberRepo {
    /// Add a user to an organization, returning the created membership.
    pub async fn create(pool: &PgPool, input: &CreateMember) -> Result<Member, sqlx::Error> {
        let query = format!(
            "INSERT INTO members (organization_id, user_id, roles) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(input.organization_id)
            .bind(input.user_id)
            .bind(&input.roles)
            .fetch_one(pool)
            .await
    }

    /// Find a user's membership in an organization.
    pub async fn find_by_user_id(
        pool: &PgPool,
        organization_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Member>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM members WHERE organization_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(organization_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a membership inactive. Returns `true` if a row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE members SET member_status = 'inactive' WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
