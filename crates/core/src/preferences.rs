//! Workflow channel preferences.
//!
//! Preferences are stored as one JSON document per workflow (and optionally
//! per user). Documents are always replaced wholesale; the only merge is the
//! read-time resolution of a user document against the workflow document in
//! [`resolve_effective`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Enabled-by-default / read-only flags for one channel (or the whole workflow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPreference {
    #[serde(default = "default_enabled")]
    pub default_value: bool,
    #[serde(default)]
    pub read_only: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for ChannelPreference {
    fn default() -> Self {
        Self {
            default_value: true,
            read_only: false,
        }
    }
}

impl ChannelPreference {
    fn enabled(default_value: bool) -> Self {
        Self {
            default_value,
            read_only: false,
        }
    }
}

/// Per-channel preferences. Channels missing from a stored document resolve
/// to enabled and editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelPreferences {
    #[serde(default)]
    pub email: ChannelPreference,
    #[serde(default)]
    pub sms: ChannelPreference,
    #[serde(default)]
    pub push: ChannelPreference,
    #[serde(default)]
    pub chat: ChannelPreference,
    #[serde(default)]
    pub in_app: ChannelPreference,
}

impl ChannelPreferences {
    fn entries_mut(&mut self) -> [&mut ChannelPreference; 5] {
        [
            &mut self.email,
            &mut self.sms,
            &mut self.push,
            &mut self.chat,
            &mut self.in_app,
        ]
    }

    fn entries(&self) -> [&ChannelPreference; 5] {
        [&self.email, &self.sms, &self.push, &self.chat, &self.in_app]
    }
}

/// The full preferences document attached to a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkflowChannelPreferences {
    #[serde(default)]
    pub workflow: ChannelPreference,
    #[serde(default)]
    pub channels: ChannelPreferences,
}

/// Flat channel on/off map used by older workflow definitions.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegacyChannelFlags {
    pub email: Option<bool>,
    pub sms: Option<bool>,
    pub push: Option<bool>,
    pub chat: Option<bool>,
    pub in_app: Option<bool>,
}

impl From<LegacyChannelFlags> for WorkflowChannelPreferences {
    fn from(flags: LegacyChannelFlags) -> Self {
        Self {
            workflow: ChannelPreference::default(),
            channels: ChannelPreferences {
                email: ChannelPreference::enabled(flags.email.unwrap_or(true)),
                sms: ChannelPreference::enabled(flags.sms.unwrap_or(true)),
                push: ChannelPreference::enabled(flags.push.unwrap_or(true)),
                chat: ChannelPreference::enabled(flags.chat.unwrap_or(true)),
                in_app: ChannelPreference::enabled(flags.in_app.unwrap_or(true)),
            },
        }
    }
}

/// Whose preferences a stored document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceType {
    /// Defaults defined on the workflow itself.
    WorkflowResource,
    /// A single user's overrides for the workflow.
    UserWorkflow,
}

impl PreferenceType {
    pub fn as_str(self) -> &'static str {
        match self {
            PreferenceType::WorkflowResource => "workflow_resource",
            PreferenceType::UserWorkflow => "user_workflow",
        }
    }
}

impl FromStr for PreferenceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workflow_resource" => Ok(PreferenceType::WorkflowResource),
            "user_workflow" => Ok(PreferenceType::UserWorkflow),
            other => Err(CoreError::Validation(format!(
                "Unknown preference type '{other}'"
            ))),
        }
    }
}

impl fmt::Display for PreferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combine workflow-level and user-level documents into what a user sees.
///
/// The user document wins, except for entries the workflow marks read-only,
/// which keep the workflow's value.
pub fn resolve_effective(
    workflow_level: Option<WorkflowChannelPreferences>,
    user_level: Option<WorkflowChannelPreferences>,
) -> Option<WorkflowChannelPreferences> {
    match (workflow_level, user_level) {
        (None, None) => None,
        (Some(workflow), None) => Some(workflow),
        (None, Some(user)) => Some(user),
        (Some(workflow), Some(mut user)) => {
            if workflow.workflow.read_only {
                user.workflow = workflow.workflow;
            }
            let locked = workflow.channels.entries();
            let entries = user.channels.entries_mut().into_iter().zip(locked);
            for (user_entry, workflow_entry) in entries {
                if workflow_entry.read_only {
                    *user_entry = *workflow_entry;
                }
            }
            Some(user)
        }
    }
}
