//! Repository for the `notification_groups` table.

use notiflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification_group::{CreateNotificationGroup, NotificationGroup};

const COLUMNS: &str = "id, environment_id, organization_id, name, created_at, updated_at";

/// Provides CRUD operations for notification groups.
pub struct NotificationGroupRepo;

impl NotificationGroupRepo {
    /// Insert a new notification group, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotificationGroup,
    ) -> Result<NotificationGroup, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_groups (environment_id, organization_id, name) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationGroup>(&query)
            .bind(input.environment_id)
            .bind(input.organization_id)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a group by id within an environment.
    pub async fn find_in_environment(
        pool: &PgPool,
        environment_id: DbId,
        id: DbId,
    ) -> Result<Option<NotificationGroup>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_groups WHERE id = $1 AND environment_id = $2"
        );
        sqlx::query_as::<_, NotificationGroup>(&query)
            .bind(id)
            .bind(environment_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a group by name within an environment.
    pub async fn find_by_name(
        pool: &PgPool,
        environment_id: DbId,
        name: &str,
    ) -> Result<Option<NotificationGroup>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_groups WHERE environment_id = $1 AND name = $2"
        );
        sqlx::query_as::<_, NotificationGroup>(&query)
            .bind(environment_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
