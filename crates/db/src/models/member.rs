//! Organization membership model and DTOs.

use notiflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Membership status for an active member.
pub const MEMBER_STATUS_ACTIVE: &str = "active";

/// A row from the `members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Member {
    pub id: DbId,
    pub organization_id: DbId,
    pub user_id: DbId,
    pub roles: Vec<String>,
    pub member_status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Member {
    pub fn is_active(&self) -> bool {
        self.member_status == MEMBER_STATUS_ACTIVE
    }
}

/// DTO for adding a user to an organization.
#[derive(Debug, Deserialize)]
pub struct CreateMember {
    pub organization_id: DbId,
    pub user_id: DbId,
    pub roles: Vec<String>,
}
