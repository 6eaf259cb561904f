//! Create or update a workflow and its steps.
//!
//! Steps are reconciled by stable identity: a payload step carrying a
//! `step_uuid` updates that step, other payload steps fall back to matching
//! by name, and anything left unmatched is created fresh. Persisted steps
//! missing from the payload are removed with their message templates.

use notiflow_core::error::CoreError;
use notiflow_core::reconcile::{existing_for_payload, pair_steps, UnmatchedStepPolicy};
use notiflow_core::types::DbId;
use notiflow_core::workflow::{
    step_identifier_for, trigger_identifier_for, validate_unique_step_names, WorkflowType,
    DEFAULT_NOTIFICATION_GROUP, MISSING_DESCRIPTION,
};
use notiflow_db::models::message_template::{CreateMessageTemplate, UpdateMessageTemplate};
use notiflow_db::models::notification_group::NotificationGroup;
use notiflow_db::models::step::{CreateStep, NotificationStep, UpdateStep};
use notiflow_db::models::workflow::{
    CreateWorkflow, StepDto, UpdateWorkflow, UpsertWorkflowDto, Workflow, WorkflowResponse,
};
use notiflow_db::repositories::{
    ControlValuesRepo, MessageTemplateRepo, NotificationGroupRepo, PreferencesRepo, StepRepo,
    WorkflowRepo,
};
use notiflow_db::DbPool;
use serde_json::Map;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::usecases::upsert_control_values::{
    UpsertControlValues, UpsertControlValuesCommand, STEP_MISSING_ID,
};
use crate::usecases::{ensure_environment, find_workflow, load_workflow_response};

pub struct UpsertWorkflowCommand {
    pub user: AuthUser,
    /// Id of the workflow to update; `None` creates a new workflow.
    pub workflow_id_for_update: Option<DbId>,
    pub workflow: UpsertWorkflowDto,
}

pub struct UpsertWorkflow;

impl UpsertWorkflow {
    pub async fn execute(
        pool: &DbPool,
        policy: UnmatchedStepPolicy,
        command: UpsertWorkflowCommand,
    ) -> AppResult<WorkflowResponse> {
        let UpsertWorkflowCommand {
            user,
            workflow_id_for_update,
            workflow: dto,
        } = command;

        dto.validate()?;
        validate_unique_step_names(dto.steps.iter().map(|s| s.name.as_str()))?;
        let step_ids = dto
            .steps
            .iter()
            .map(|s| step_identifier_for(&s.name))
            .collect::<Result<Vec<_>, _>>()?;
        let trigger_identifier = trigger_identifier_for(&dto.name)?;

        ensure_environment(pool, &user).await?;

        let existing = match workflow_id_for_update {
            Some(id) => Some(find_workflow(pool, &user, id).await?),
            None => None,
        };

        let clash = WorkflowRepo::find_by_trigger_identifier(
            pool,
            user.environment_id,
            &trigger_identifier,
        )
        .await?
        .filter(|other| existing.as_ref().map_or(true, |w| w.id != other.id));
        if clash.is_some() {
            return Err(AppError::Core(CoreError::BadRequest(format!(
                "Workflow with trigger identifier '{trigger_identifier}' already exists"
            ))));
        }

        let workflow = match existing {
            Some(existing) => {
                update_workflow(pool, policy, &user, existing, &dto, &trigger_identifier, &step_ids)
                    .await?
            }
            None => create_workflow(pool, &user, &dto, &trigger_identifier, &step_ids).await?,
        };

        let steps = StepRepo::list_for_workflow(pool, workflow.id).await?;
        upsert_step_controls(pool, policy, &workflow, &steps, &dto.steps).await?;

        if let Some(preferences) = &dto.preferences {
            PreferencesRepo::upsert_workflow_preferences(
                pool,
                workflow.environment_id,
                workflow.organization_id,
                workflow.id,
                preferences,
            )
            .await?;
        }

        load_workflow_response(pool, &workflow).await
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

async fn create_workflow(
    pool: &DbPool,
    user: &AuthUser,
    dto: &UpsertWorkflowDto,
    trigger_identifier: &str,
    step_ids: &[String],
) -> AppResult<Workflow> {
    let group = resolve_notification_group(pool, user, dto.notification_group_id).await?;

    let workflow = WorkflowRepo::create(
        pool,
        &CreateWorkflow {
            environment_id: user.environment_id,
            organization_id: user.organization_id,
            notification_group_id: group.id,
            name: dto.name.clone(),
            trigger_identifier: trigger_identifier.to_string(),
            description: dto
                .description
                .clone()
                .unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
            tags: dto.tags.clone().unwrap_or_default(),
            active: dto.active.unwrap_or(true),
            critical: dto.critical.unwrap_or(false),
            origin: dto.origin,
            workflow_type: WorkflowType::Bridge.as_str().to_string(),
            created_by: Some(user.user_id),
        },
    )
    .await?;

    for (position, (step, step_id)) in dto.steps.iter().zip(step_ids).enumerate() {
        create_step(pool, &workflow, step, step_id, position as i32).await?;
    }

    tracing::info!(
        workflow_id = workflow.id,
        user_id = user.user_id,
        trigger_identifier = %workflow.trigger_identifier,
        steps = dto.steps.len(),
        "Workflow created",
    );

    Ok(workflow)
}

/// The payload's group if given, else the environment's default group.
async fn resolve_notification_group(
    pool: &DbPool,
    user: &AuthUser,
    group_id: Option<DbId>,
) -> AppResult<NotificationGroup> {
    let group = match group_id {
        Some(id) => {
            NotificationGroupRepo::find_in_environment(pool, user.environment_id, id).await?
        }
        None => {
            NotificationGroupRepo::find_by_name(
                pool,
                user.environment_id,
                DEFAULT_NOTIFICATION_GROUP,
            )
            .await?
        }
    };
    group.ok_or_else(|| {
        AppError::Core(CoreError::BadRequest("Notification group not found".into()))
    })
}

/// Insert a message template and the step that points at it.
async fn create_step(
    pool: &DbPool,
    workflow: &Workflow,
    step: &StepDto,
    step_id: &str,
    position: i32,
) -> AppResult<NotificationStep> {
    let template = MessageTemplateRepo::create(
        pool,
        &CreateMessageTemplate {
            environment_id: workflow.environment_id,
            organization_id: workflow.organization_id,
            workflow_id: workflow.id,
            step_type: step.step_type.as_str().to_string(),
            name: Some(step.name.clone()),
            controls: step.controls.as_ref().map(|c| c.schema.clone()),
        },
    )
    .await?;

    Ok(StepRepo::create(
        pool,
        &CreateStep {
            workflow_id: workflow.id,
            template_id: template.id,
            step_id: step_id.to_string(),
            name: step.name.clone(),
            position,
            should_stop_on_fail: step.should_stop_on_fail,
            active: step.active.unwrap_or(true),
        },
    )
    .await?)
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

async fn update_workflow(
    pool: &DbPool,
    policy: UnmatchedStepPolicy,
    user: &AuthUser,
    existing: Workflow,
    dto: &UpsertWorkflowDto,
    trigger_identifier: &str,
    step_ids: &[String],
) -> AppResult<Workflow> {
    let workflow = WorkflowRepo::update(
        pool,
        user.environment_id,
        user.organization_id,
        existing.id,
        &UpdateWorkflow {
            name: dto.name.clone(),
            trigger_identifier: trigger_identifier.to_string(),
            description: dto.description.clone(),
            tags: dto.tags.clone(),
            active: dto.active.unwrap_or(true),
            critical: dto.critical,
            origin: dto.origin,
            workflow_type: WorkflowType::Bridge.as_str().to_string(),
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Workflow",
        id: existing.id,
    }))?;

    reconcile_steps(pool, policy, &workflow, &dto.steps, step_ids).await?;

    tracing::info!(
        workflow_id = workflow.id,
        user_id = user.user_id,
        steps = dto.steps.len(),
        "Workflow updated",
    );

    Ok(workflow)
}

/// Bring the persisted steps in line with the payload, in payload order.
async fn reconcile_steps(
    pool: &DbPool,
    policy: UnmatchedStepPolicy,
    workflow: &Workflow,
    payload: &[StepDto],
    step_ids: &[String],
) -> AppResult<()> {
    let persisted = StepRepo::list_for_workflow(pool, workflow.id).await?;
    let pairs = pair_steps(&persisted, payload);
    let matched = existing_for_payload(&pairs, payload.len());

    let dropped: Vec<&NotificationStep> = persisted
        .iter()
        .zip(&pairs)
        .filter(|(_, pair)| pair.is_none())
        .map(|(step, _)| step)
        .collect();
    let mut obsolete_steps: Vec<DbId> = dropped.iter().map(|s| s.id).collect();
    let obsolete_templates: Vec<DbId> = dropped.iter().filter_map(|s| s.template_id).collect();

    for &step_uuid in &obsolete_templates {
        apply_unmatched_policy(pool, policy, workflow, step_uuid).await?;
    }

    for (position, ((step, step_id), current)) in
        payload.iter().zip(step_ids).zip(matched).enumerate()
    {
        let position = position as i32;
        let current = current.map(|idx| &persisted[idx]);
        match current.and_then(|c| c.template_id.map(|tid| (c, tid))) {
            Some((current, template_id)) => {
                update_step(pool, current, template_id, step, step_id, position).await?;
            }
            None => {
                // A matched step whose template is gone is replaced outright.
                if let Some(current) = current {
                    obsolete_steps.push(current.id);
                }
                create_step(pool, workflow, step, step_id, position).await?;
            }
        }
    }

    let steps_removed = StepRepo::delete_many(pool, &obsolete_steps).await?;
    let templates_removed = MessageTemplateRepo::delete_many(pool, &obsolete_templates).await?;
    if steps_removed > 0 {
        tracing::debug!(
            workflow_id = workflow.id,
            steps_removed,
            templates_removed,
            "Removed steps missing from payload",
        );
    }

    Ok(())
}

async fn update_step(
    pool: &DbPool,
    current: &NotificationStep,
    template_id: DbId,
    step: &StepDto,
    step_id: &str,
    position: i32,
) -> AppResult<()> {
    MessageTemplateRepo::update(
        pool,
        template_id,
        &UpdateMessageTemplate {
            step_type: step.step_type.as_str().to_string(),
            name: Some(step.name.clone()),
            controls: step.controls.as_ref().map(|c| c.schema.clone()),
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "MessageTemplate",
        id: template_id,
    }))?;

    StepRepo::update(
        pool,
        current.id,
        &UpdateStep {
            step_id: step_id.to_string(),
            name: step.name.clone(),
            position,
            should_stop_on_fail: step.should_stop_on_fail,
            active: step.active.unwrap_or(current.active),
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Step",
        id: current.id,
    }))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Control values
// ---------------------------------------------------------------------------

/// Write each persisted step's control values from its payload counterpart.
async fn upsert_step_controls(
    pool: &DbPool,
    policy: UnmatchedStepPolicy,
    workflow: &Workflow,
    steps: &[NotificationStep],
    payload: &[StepDto],
) -> AppResult<()> {
    let pairs = pair_steps(steps, payload);

    for (step, pair) in steps.iter().zip(pairs) {
        let has_step_id = step.step_id.as_deref().is_some_and(|s| !s.is_empty());
        let step_uuid = match step.template_id {
            Some(uuid) if has_step_id => uuid,
            _ => return Err(AppError::Core(CoreError::Internal(STEP_MISSING_ID.into()))),
        };

        let Some(idx) = pair else {
            apply_unmatched_policy(pool, policy, workflow, step_uuid).await?;
            continue;
        };

        let dto_step = &payload[idx];
        let controls = dto_step.controls.clone().unwrap_or_default();
        let values = dto_step.control_values.clone().unwrap_or_else(Map::new);
        UpsertControlValues::execute(
            pool,
            UpsertControlValuesCommand {
                workflow,
                step,
                controls: &controls,
                new_values: &values,
            },
        )
        .await?;
    }

    Ok(())
}

async fn apply_unmatched_policy(
    pool: &DbPool,
    policy: UnmatchedStepPolicy,
    workflow: &Workflow,
    step_uuid: DbId,
) -> AppResult<()> {
    match policy {
        UnmatchedStepPolicy::Skip => {
            tracing::debug!(workflow_id = workflow.id, step_uuid, "Unmatched step skipped");
        }
        UnmatchedStepPolicy::Delete => {
            let removed = ControlValuesRepo::delete_many(
                pool,
                workflow.environment_id,
                workflow.organization_id,
                workflow.id,
                Some(step_uuid),
            )
            .await?;
            tracing::debug!(
                workflow_id = workflow.id,
                step_uuid,
                removed,
                "Unmatched step control values deleted",
            );
        }
    }
    Ok(())
}
