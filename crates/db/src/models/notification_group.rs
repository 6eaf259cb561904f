//! Notification group entity model and DTOs.

use notiflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notification_groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationGroup {
    pub id: DbId,
    pub environment_id: DbId,
    pub organization_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a notification group.
#[derive(Debug, Deserialize)]
pub struct CreateNotificationGroup {
    pub environment_id: DbId,
    pub organization_id: DbId,
    pub name: String,
}
