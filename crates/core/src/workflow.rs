//! Workflow domain constants, enums, and validation helpers.
//!
//! Enum values are stored as TEXT in the database; each enum round-trips
//! through [`as_str`](StepType::as_str) and `FromStr`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
   Defaults and sentinels
   -------------------------------------------------------------------------- */

/// Reported for steps that were persisted without a name.
pub const MISSING_STEP_NAME: &str = "Missing Name";

/// Stored as the description of workflows created without one.
pub const MISSING_DESCRIPTION: &str = "Missing Description";

/// Reported when a workflow has no update timestamp.
pub const MISSING_UPDATED_AT: &str = "Missing Updated At";

/// Name of the notification group used when the payload does not name one.
pub const DEFAULT_NOTIFICATION_GROUP: &str = "General";

/// Priority written on every control-values insert and update.
pub const CONTROL_VALUES_PRIORITY: i32 = 0;

/* --------------------------------------------------------------------------
   Limits
   -------------------------------------------------------------------------- */

/// Maximum length of a workflow name.
pub const MAX_WORKFLOW_NAME_LEN: usize = 200;

/// Maximum length of a workflow description.
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Maximum number of steps in a single workflow.
pub const MAX_STEPS_PER_WORKFLOW: usize = 100;

/// Maximum number of tags on a workflow.
pub const MAX_TAGS: usize = 16;

/* --------------------------------------------------------------------------
   Enums
   -------------------------------------------------------------------------- */

/// Channel (or action) a step performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Email,
    Sms,
    Push,
    Chat,
    InApp,
    Delay,
    Digest,
    Custom,
}

impl StepType {
    pub const ALL: [StepType; 8] = [
        StepType::Email,
        StepType::Sms,
        StepType::Push,
        StepType::Chat,
        StepType::InApp,
        StepType::Delay,
        StepType::Digest,
        StepType::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StepType::Email => "email",
            StepType::Sms => "sms",
            StepType::Push => "push",
            StepType::Chat => "chat",
            StepType::InApp => "in_app",
            StepType::Delay => "delay",
            StepType::Digest => "digest",
            StepType::Custom => "custom",
        }
    }

    /// Parse a stored value, falling back to [`StepType::Email`] for anything
    /// unrecognised.
    pub fn from_stored(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or(StepType::Email)
    }
}

impl FromStr for StepType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown step type '{s}'")))
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a workflow was authored, which decides the endpoint used at
/// preview and execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowOrigin {
    /// Authored on the platform itself.
    #[default]
    Novu,
    /// Authored in a customer-hosted bridge application.
    External,
}

impl WorkflowOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowOrigin::Novu => "novu",
            WorkflowOrigin::External => "external",
        }
    }

    /// Resolve a nullable stored origin; absent or unknown values are
    /// reported as the platform origin.
    pub fn from_stored(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for WorkflowOrigin {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "novu" => Ok(WorkflowOrigin::Novu),
            "external" => Ok(WorkflowOrigin::External),
            other => Err(CoreError::Validation(format!(
                "Unknown workflow origin '{other}'"
            ))),
        }
    }
}

/// Workflow kind. Workflows written through the upsert API are `Bridge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowType {
    Regular,
    Echo,
    Bridge,
}

impl WorkflowType {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowType::Regular => "REGULAR",
            WorkflowType::Echo => "ECHO",
            WorkflowType::Bridge => "BRIDGE",
        }
    }
}

/// Level a control-values record applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlValuesLevel {
    StepControls,
    WorkflowControls,
}

impl ControlValuesLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlValuesLevel::StepControls => "step_controls",
            ControlValuesLevel::WorkflowControls => "workflow_controls",
        }
    }
}

/* --------------------------------------------------------------------------
   Identifiers and validation
   -------------------------------------------------------------------------- */

/// Validate a workflow name and return its trigger identifier.
///
/// The identifier is the name with surrounding whitespace removed, so two
/// workflows clash only when their names are equal.
pub fn trigger_identifier_for(name: &str) -> Result<String, CoreError> {
    identifier_for("Workflow", name)
}

/// Validate a step name and return its step identifier.
pub fn step_identifier_for(name: &str) -> Result<String, CoreError> {
    identifier_for("Step", name)
}

fn identifier_for(kind: &str, name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{kind} name must not be empty")));
    }
    if trimmed.chars().count() > MAX_WORKFLOW_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "{kind} name must be at most {MAX_WORKFLOW_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Step names are the fallback identity during reconciliation, so a payload
/// must not repeat them.
pub fn validate_unique_step_names<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> Result<(), CoreError> {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CoreError::Validation(format!(
                "Duplicate step name '{name}'"
            )));
        }
    }
    Ok(())
}
