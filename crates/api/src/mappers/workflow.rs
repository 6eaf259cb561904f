//! Workflow entity -> response mapping.
//!
//! All functions here are pure and infallible. Absent stored values are
//! reported with the sentinels from `notiflow_core::workflow`.

use std::collections::HashMap;

use notiflow_core::controls::{as_object_or_empty, ControlsSchema};
use notiflow_core::preferences::{LegacyChannelFlags, WorkflowChannelPreferences};
use notiflow_core::types::{DbId, Timestamp};
use notiflow_core::workflow::{StepType, WorkflowOrigin, MISSING_STEP_NAME, MISSING_UPDATED_AT};
use notiflow_db::models::message_template::MessageTemplate;
use notiflow_db::models::step::NotificationStep;
use notiflow_db::models::workflow::{MinifiedWorkflow, StepResponse, Workflow, WorkflowResponse};
use serde_json::Value;

/// Everything needed to render one workflow.
pub struct WorkflowParts<'a> {
    pub workflow: &'a Workflow,
    pub steps: &'a [NotificationStep],
    /// Message templates keyed by id.
    pub templates: &'a HashMap<DbId, MessageTemplate>,
    /// Stored step-level control values keyed by step uuid.
    pub control_values: &'a HashMap<DbId, Value>,
    pub preferences: Option<WorkflowChannelPreferences>,
}

pub fn to_workflow_response(parts: WorkflowParts<'_>) -> WorkflowResponse {
    let WorkflowParts {
        workflow,
        steps,
        templates,
        control_values,
        preferences,
    } = parts;

    let steps = steps
        .iter()
        .map(|step| {
            let template = step.template_id.and_then(|id| templates.get(&id));
            let stored = step.template_id.and_then(|id| control_values.get(&id));
            to_step_response(step, template, stored)
        })
        .collect();

    WorkflowResponse {
        id: workflow.id,
        name: workflow.name.clone(),
        description: workflow.description.clone(),
        tags: workflow.tags.clone(),
        active: workflow.active,
        critical: workflow.critical,
        notification_group_id: workflow.notification_group_id,
        origin: WorkflowOrigin::from_stored(workflow.origin.as_deref()),
        preferences,
        steps,
        updated_at: format_updated_at(workflow.updated_at),
    }
}

/// Render one step. `stored_controls` (the persisted control-values record)
/// replaces the step's inline control variables when present.
pub fn to_step_response(
    step: &NotificationStep,
    template: Option<&MessageTemplate>,
    stored_controls: Option<&Value>,
) -> StepResponse {
    let control_values = as_object_or_empty(stored_controls.unwrap_or(&step.control_variables));

    StepResponse {
        step_uuid: step.template_id,
        name: step
            .name
            .clone()
            .unwrap_or_else(|| MISSING_STEP_NAME.to_string()),
        step_type: step_type_of(template),
        controls: template
            .and_then(|t| t.controls.clone())
            .map(|schema| ControlsSchema { schema }),
        active: step.active,
        should_stop_on_fail: step.should_stop_on_fail,
        control_values,
    }
}

pub fn to_minified_workflow(workflow: &Workflow, step_types: Vec<StepType>) -> MinifiedWorkflow {
    MinifiedWorkflow {
        id: workflow.id,
        name: workflow.name.clone(),
        tags: workflow.tags.clone(),
        updated_at: format_updated_at(workflow.updated_at),
        step_type_overviews: step_types,
    }
}

/// Summaries for a page of workflows; `step_types` is keyed by workflow id.
pub fn to_minified_workflows(
    workflows: &[Workflow],
    step_types: &mut HashMap<DbId, Vec<StepType>>,
) -> Vec<MinifiedWorkflow> {
    workflows
        .iter()
        .map(|w| to_minified_workflow(w, step_types.remove(&w.id).unwrap_or_default()))
        .collect()
}

/// Step type of a step, `email` when its template is missing or unknown.
pub fn step_type_of(template: Option<&MessageTemplate>) -> StepType {
    StepType::from_stored(template.map(|t| t.step_type.as_str()))
}

pub fn legacy_channels_to_preferences(flags: LegacyChannelFlags) -> WorkflowChannelPreferences {
    WorkflowChannelPreferences::from(flags)
}

fn format_updated_at(updated_at: Option<Timestamp>) -> String {
    updated_at
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_else(|| MISSING_UPDATED_AT.to_string())
}
