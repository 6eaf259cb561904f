use notiflow_core::controls::{diff_control_values, ControlsSchema};
use notiflow_core::error::CoreError;
use notiflow_core::workflow::{ControlValuesLevel, CONTROL_VALUES_PRIORITY};
use notiflow_db::models::control_values::{ControlValues, ControlValuesKey, CreateControlValues};
use notiflow_db::models::step::NotificationStep;
use notiflow_db::models::workflow::Workflow;
use notiflow_db::repositories::ControlValuesRepo;
use notiflow_db::DbPool;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Raised when a persisted step has no stable identity to key values by.
pub const STEP_MISSING_ID: &str = "Step upsert mechanism failed due to missing id";

pub struct UpsertControlValuesCommand<'a> {
    pub workflow: &'a Workflow,
    pub step: &'a NotificationStep,
    pub controls: &'a ControlsSchema,
    pub new_values: &'a Map<String, Value>,
}

/// Store a step's control values, keeping one record per step.
pub struct UpsertControlValues;

impl UpsertControlValues {
    pub async fn execute(
        pool: &DbPool,
        command: UpsertControlValuesCommand<'_>,
    ) -> AppResult<ControlValues> {
        let UpsertControlValuesCommand {
            workflow,
            step,
            controls,
            new_values,
        } = command;

        let step_uuid = step
            .template_id
            .ok_or_else(|| AppError::Core(CoreError::Internal(STEP_MISSING_ID.into())))?;

        let stored = Value::Object(diff_control_values(new_values, &controls.schema));

        let key = ControlValuesKey {
            environment_id: workflow.environment_id,
            organization_id: workflow.organization_id,
            workflow_id: workflow.id,
            step_id: step_uuid,
            level: ControlValuesLevel::StepControls,
        };

        match ControlValuesRepo::find_first(pool, &key).await? {
            Some(existing) => ControlValuesRepo::update(
                pool,
                existing.id,
                workflow.organization_id,
                CONTROL_VALUES_PRIORITY,
                &stored,
                &stored,
            )
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "ControlValues",
                id: existing.id,
            })),
            None => Ok(ControlValuesRepo::create(
                pool,
                &CreateControlValues {
                    key,
                    priority: CONTROL_VALUES_PRIORITY,
                    controls: stored.clone(),
                    inputs: stored,
                },
            )
            .await?),
        }
    }
}
