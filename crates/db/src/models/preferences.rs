//! Stored preferences documents.

use notiflow_core::preferences::{
    LegacyChannelFlags, PreferenceType, WorkflowChannelPreferences,
};
use notiflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `preferences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Preferences {
    pub id: DbId,
    pub environment_id: DbId,
    pub organization_id: DbId,
    pub workflow_id: DbId,
    pub user_id: Option<DbId>,
    pub preference_type: String,
    pub preferences: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Preferences {
    /// Parse the stored JSON document.
    pub fn document(&self) -> Result<WorkflowChannelPreferences, serde_json::Error> {
        serde_json::from_value(self.preferences.clone())
    }
}

// ---------------------------------------------------------------------------
// API request / response types
// ---------------------------------------------------------------------------

/// A preferences document as accepted by the API: the full document, or the
/// flat channel map used by older workflow definitions.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PreferencesPayload {
    Legacy(LegacyChannelFlags),
    Document(WorkflowChannelPreferences),
}

/// Request body for `PUT /workflows/{id}/preferences`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertPreferencesDto {
    /// Whether to write the workflow defaults or the caller's own overrides.
    #[serde(default = "default_preference_type")]
    pub preference_type: PreferenceType,
    pub preferences: PreferencesPayload,
}

fn default_preference_type() -> PreferenceType {
    PreferenceType::WorkflowResource
}

/// Preferences of a workflow as seen by one user.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowPreferencesResponse {
    pub workflow_id: DbId,
    pub workflow_preferences: Option<WorkflowChannelPreferences>,
    pub user_preferences: Option<WorkflowChannelPreferences>,
    /// User overrides applied over the workflow defaults.
    pub effective: Option<WorkflowChannelPreferences>,
}
