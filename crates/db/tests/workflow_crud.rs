//! Integration tests for the workflow repositories.
//!
//! Exercises scoping by environment and organization, the trigger
//! identifier uniqueness constraint, and what a workflow delete removes.

use notiflow_core::preferences::WorkflowChannelPreferences;
use notiflow_core::workflow::{ControlValuesLevel, WorkflowOrigin};
use notiflow_db::models::control_values::{ControlValuesKey, CreateControlValues};
use notiflow_db::models::environment::CreateEnvironment;
use notiflow_db::models::message_template::{CreateMessageTemplate, UpdateMessageTemplate};
use notiflow_db::models::notification_group::CreateNotificationGroup;
use notiflow_db::models::organization::CreateOrganization;
use notiflow_db::models::step::{CreateStep, UpdateStep};
use notiflow_db::models::workflow::{CreateWorkflow, UpdateWorkflow};
use notiflow_db::repositories::{
    ControlValuesRepo, EnvironmentRepo, MessageTemplateRepo, NotificationGroupRepo,
    OrganizationRepo, PreferencesRepo, StepRepo, WorkflowRepo,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Scope {
    organization_id: i64,
    environment_id: i64,
    group_id: i64,
}

async fn seed_scope(pool: &PgPool, org_name: &str) -> Scope {
    let org = OrganizationRepo::create(
        pool,
        &CreateOrganization {
            name: org_name.to_string(),
        },
    )
    .await
    .unwrap();
    let env = EnvironmentRepo::create(
        pool,
        &CreateEnvironment {
            organization_id: org.id,
            name: "Development".to_string(),
        },
    )
    .await
    .unwrap();
    let group = NotificationGroupRepo::create(
        pool,
        &CreateNotificationGroup {
            environment_id: env.id,
            organization_id: org.id,
            name: "General".to_string(),
        },
    )
    .await
    .unwrap();
    Scope {
        organization_id: org.id,
        environment_id: env.id,
        group_id: group.id,
    }
}

fn new_workflow(scope: &Scope, name: &str, trigger: &str) -> CreateWorkflow {
    CreateWorkflow {
        environment_id: scope.environment_id,
        organization_id: scope.organization_id,
        notification_group_id: scope.group_id,
        name: name.to_string(),
        trigger_identifier: trigger.to_string(),
        description: "Missing Description".to_string(),
        tags: vec![],
        active: true,
        critical: false,
        origin: None,
        workflow_type: "BRIDGE".to_string(),
        created_by: None,
    }
}

async fn add_step(
    pool: &PgPool,
    scope: &Scope,
    workflow_id: i64,
    name: &str,
    position: i32,
) -> i64 {
    let template = MessageTemplateRepo::create(
        pool,
        &CreateMessageTemplate {
            environment_id: scope.environment_id,
            organization_id: scope.organization_id,
            workflow_id,
            step_type: "email".to_string(),
            name: Some(name.to_string()),
            controls: None,
        },
    )
    .await
    .unwrap();
    StepRepo::create(
        pool,
        &CreateStep {
            workflow_id,
            template_id: template.id,
            step_id: name.to_string(),
            name: name.to_string(),
            position,
            should_stop_on_fail: false,
            active: true,
        },
    )
    .await
    .unwrap();
    template.id
}

// ---------------------------------------------------------------------------
// Workflows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_create_and_find_workflow(pool: PgPool) {
    let scope = seed_scope(&pool, "Acme").await;

    let created = WorkflowRepo::create(&pool, &new_workflow(&scope, "Welcome", "welcome"))
        .await
        .unwrap();
    assert!(created.active);
    assert!(!created.draft);
    assert_eq!(created.origin, None);

    let (env, org) = (scope.environment_id, scope.organization_id);
    let found = WorkflowRepo::find_by_id(&pool, env, org, created.id)
        .await
        .unwrap()
        .expect("workflow should exist");
    assert_eq!(found.trigger_identifier, "welcome");

    let by_trigger = WorkflowRepo::find_by_trigger_identifier(&pool, env, "welcome")
        .await
        .unwrap();
    assert_eq!(by_trigger.map(|w| w.id), Some(created.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_find_is_scoped_to_environment_and_organization(pool: PgPool) {
    let acme = seed_scope(&pool, "Acme").await;
    let globex = seed_scope(&pool, "Globex").await;

    let workflow = WorkflowRepo::create(&pool, &new_workflow(&acme, "Welcome", "welcome"))
        .await
        .unwrap();

    let cross_env =
        WorkflowRepo::find_by_id(&pool, globex.environment_id, acme.organization_id, workflow.id)
            .await
            .unwrap();
    assert!(cross_env.is_none());

    let cross_org =
        WorkflowRepo::find_by_id(&pool, acme.environment_id, globex.organization_id, workflow.id)
            .await
            .unwrap();
    assert!(cross_org.is_none());

    let deleted =
        WorkflowRepo::delete(&pool, globex.environment_id, globex.organization_id, workflow.id)
            .await
            .unwrap();
    assert!(!deleted);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_trigger_identifier_violates_constraint(pool: PgPool) {
    let scope = seed_scope(&pool, "Acme").await;
    WorkflowRepo::create(&pool, &new_workflow(&scope, "Welcome", "welcome"))
        .await
        .unwrap();

    let err = WorkflowRepo::create(&pool, &new_workflow(&scope, "Welcome!", "welcome"))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(
        db_err.constraint(),
        Some("uq_notification_templates_environment_trigger")
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_keeps_unset_fields(pool: PgPool) {
    let scope = seed_scope(&pool, "Acme").await;
    let mut input = new_workflow(&scope, "Welcome", "welcome");
    input.tags = vec!["onboarding".to_string()];
    let workflow = WorkflowRepo::create(&pool, &input).await.unwrap();

    let updated = WorkflowRepo::update(
        &pool,
        scope.environment_id,
        scope.organization_id,
        workflow.id,
        &UpdateWorkflow {
            name: "Welcome v2".to_string(),
            trigger_identifier: "welcome-v2".to_string(),
            description: None,
            tags: None,
            active: false,
            critical: None,
            origin: Some(WorkflowOrigin::External),
            workflow_type: "BRIDGE".to_string(),
        },
    )
    .await
    .unwrap()
    .expect("workflow should exist");

    assert_eq!(updated.name, "Welcome v2");
    assert_eq!(updated.tags, vec!["onboarding".to_string()]);
    assert_eq!(updated.description.as_deref(), Some("Missing Description"));
    assert!(updated.draft);
    assert_eq!(updated.origin.as_deref(), Some("external"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_filters_by_name_and_counts(pool: PgPool) {
    let scope = seed_scope(&pool, "Acme").await;
    let seeds = [
        ("Welcome", "welcome"),
        ("Password reset", "password-reset"),
        ("Welcome back", "welcome-back"),
    ];
    for (name, trigger) in seeds {
        WorkflowRepo::create(&pool, &new_workflow(&scope, name, trigger))
            .await
            .unwrap();
    }

    let all = WorkflowRepo::list(&pool, scope.environment_id, scope.organization_id, None, 20, 0)
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let (env, org) = (scope.environment_id, scope.organization_id);
    let welcome = WorkflowRepo::list(&pool, env, org, Some("WELCOME"), 20, 0)
        .await
        .unwrap();
    assert_eq!(welcome.len(), 2);

    let total = WorkflowRepo::count(&pool, env, org, Some("welcome"))
        .await
        .unwrap();
    assert_eq!(total, 2);

    let page = WorkflowRepo::list(&pool, scope.environment_id, scope.organization_id, None, 1, 1)
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_treats_wildcards_in_query_literally(pool: PgPool) {
    let scope = seed_scope(&pool, "Acme").await;
    for (name, trigger) in [("Welcome", "Welcome"), ("50% off_sale", "50% off_sale")] {
        WorkflowRepo::create(&pool, &new_workflow(&scope, name, trigger))
            .await
            .unwrap();
    }
    let (env, org) = (scope.environment_id, scope.organization_id);

    for query in ["_", "%"] {
        let found = WorkflowRepo::list(&pool, env, org, Some(query), 20, 0)
            .await
            .unwrap();
        assert_eq!(found.len(), 1, "query {query:?}");
        assert_eq!(found[0].name, "50% off_sale");
    }

    let total = WorkflowRepo::count(&pool, env, org, Some("%_"))
        .await
        .unwrap();
    assert_eq!(total, 0);
}

// ---------------------------------------------------------------------------
// Steps and message templates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_steps_list_in_position_order(pool: PgPool) {
    let scope = seed_scope(&pool, "Acme").await;
    let workflow = WorkflowRepo::create(&pool, &new_workflow(&scope, "Welcome", "welcome"))
        .await
        .unwrap();
    add_step(&pool, &scope, workflow.id, "second", 1).await;
    add_step(&pool, &scope, workflow.id, "first", 0).await;

    let steps = StepRepo::list_for_workflow(&pool, workflow.id).await.unwrap();
    let names: Vec<_> = steps.iter().map(|s| s.name.clone().unwrap()).collect();
    assert_eq!(names, vec!["first", "second"]);

    let renamed = StepRepo::update(
        &pool,
        steps[0].id,
        &UpdateStep {
            step_id: "opening".to_string(),
            name: "opening".to_string(),
            position: 0,
            should_stop_on_fail: true,
            active: true,
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(renamed.template_id, steps[0].template_id);
    assert!(renamed.should_stop_on_fail);

    let removed = StepRepo::delete_many(&pool, &[steps[1].id]).await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(StepRepo::delete_many(&pool, &[]).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_message_template_update_overwrites_controls(pool: PgPool) {
    let scope = seed_scope(&pool, "Acme").await;
    let workflow = WorkflowRepo::create(&pool, &new_workflow(&scope, "Welcome", "welcome"))
        .await
        .unwrap();
    let template_id = add_step(&pool, &scope, workflow.id, "email", 0).await;

    let updated = MessageTemplateRepo::update(
        &pool,
        template_id,
        &UpdateMessageTemplate {
            step_type: "sms".to_string(),
            name: Some("text".to_string()),
            controls: Some(json!({ "type": "object" })),
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.step_type, "sms");
    assert_eq!(updated.controls, Some(json!({ "type": "object" })));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_workflow_delete_cascades_steps_but_not_message_templates(pool: PgPool) {
    let scope = seed_scope(&pool, "Acme").await;
    let workflow = WorkflowRepo::create(&pool, &new_workflow(&scope, "Welcome", "welcome"))
        .await
        .unwrap();
    add_step(&pool, &scope, workflow.id, "email", 0).await;
    add_step(&pool, &scope, workflow.id, "sms", 1).await;
    PreferencesRepo::upsert_workflow_preferences(
        &pool,
        scope.environment_id,
        scope.organization_id,
        workflow.id,
        &WorkflowChannelPreferences::default(),
    )
    .await
    .unwrap();

    let deleted =
        WorkflowRepo::delete(&pool, scope.environment_id, scope.organization_id, workflow.id)
            .await
            .unwrap();
    assert!(deleted);

    assert!(StepRepo::list_for_workflow(&pool, workflow.id).await.unwrap().is_empty());
    let prefs = PreferencesRepo::find_workflow_preferences(
        &pool,
        scope.environment_id,
        scope.organization_id,
        workflow.id,
    )
    .await
    .unwrap();
    assert!(prefs.is_none());

    let templates = MessageTemplateRepo::list_for_workflow(
        &pool,
        scope.environment_id,
        scope.organization_id,
        workflow.id,
    )
    .await
    .unwrap();
    assert_eq!(templates.len(), 2);

    let removed = MessageTemplateRepo::delete_for_workflow(
        &pool,
        scope.environment_id,
        scope.organization_id,
        workflow.id,
    )
    .await
    .unwrap();
    assert_eq!(removed, 2);
}

// ---------------------------------------------------------------------------
// Control values
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_control_values_create_update_and_delete(pool: PgPool) {
    let scope = seed_scope(&pool, "Acme").await;
    let workflow = WorkflowRepo::create(&pool, &new_workflow(&scope, "Welcome", "welcome"))
        .await
        .unwrap();
    let step_id = add_step(&pool, &scope, workflow.id, "email", 0).await;
    let key = ControlValuesKey {
        environment_id: scope.environment_id,
        organization_id: scope.organization_id,
        workflow_id: workflow.id,
        step_id,
        level: ControlValuesLevel::StepControls,
    };

    assert!(ControlValuesRepo::find_first(&pool, &key).await.unwrap().is_none());

    let created = ControlValuesRepo::create(
        &pool,
        &CreateControlValues {
            key,
            priority: 0,
            controls: json!({ "subject": "Hi" }),
            inputs: json!({ "subject": "Hi" }),
        },
    )
    .await
    .unwrap();
    assert_eq!(created.level, "step_controls");

    let updated = ControlValuesRepo::update(
        &pool,
        created.id,
        scope.organization_id,
        0,
        &json!({ "subject": "Hello" }),
        &json!({ "subject": "Hello" }),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.controls, json!({ "subject": "Hello" }));

    let wrong_org = ControlValuesRepo::update(
        &pool,
        created.id,
        scope.organization_id + 1000,
        0,
        &json!({}),
        &json!({}),
    )
    .await
    .unwrap();
    assert!(wrong_org.is_none());

    let removed = ControlValuesRepo::delete_many(
        &pool,
        scope.environment_id,
        scope.organization_id,
        workflow.id,
        Some(step_id),
    )
    .await
    .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(
        ControlValuesRepo::count_for_workflow(
            &pool,
            scope.environment_id,
            scope.organization_id,
            workflow.id,
        )
        .await
        .unwrap(),
        0
    );
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_preferences_upsert_replaces_document(pool: PgPool) {
    let scope = seed_scope(&pool, "Acme").await;
    let workflow = WorkflowRepo::create(&pool, &new_workflow(&scope, "Welcome", "welcome"))
        .await
        .unwrap();

    let mut prefs = WorkflowChannelPreferences::default();
    prefs.channels.sms.default_value = false;
    let first = PreferencesRepo::upsert_workflow_preferences(
        &pool,
        scope.environment_id,
        scope.organization_id,
        workflow.id,
        &prefs,
    )
    .await
    .unwrap();

    let second = PreferencesRepo::upsert_workflow_preferences(
        &pool,
        scope.environment_id,
        scope.organization_id,
        workflow.id,
        &WorkflowChannelPreferences::default(),
    )
    .await
    .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.document().unwrap(), WorkflowChannelPreferences::default());
    assert_eq!(second.preference_type, "workflow_resource");
}
