//! HTTP-level tests for login and organization switching.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_tenant_for, create_user, get_auth, post_json, post_json_auth};
use notiflow_api::auth::password::hash_password;
use notiflow_db::repositories::MemberRepo;
use serde_json::json;
use sqlx::PgPool;

const PASSWORD: &str = "test_password_123!";

async fn create_login_user(pool: &PgPool, email: &str) -> notiflow_db::models::user::User {
    let hashed = hash_password(PASSWORD).expect("hashing should succeed");
    create_user(pool, email, &hashed).await
}

async fn login(app: axum::Router, email: &str, password: &str) -> axum::response::Response {
    post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": email, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_returns_token_scoped_to_first_organization(pool: PgPool) {
    let user = create_login_user(&pool, "ada@acme.test").await;
    let tenant = create_tenant_for(&pool, user.clone(), "Acme").await;

    let response = login(build(&pool), "ada@acme.test", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert!(data["access_token"].is_string());
    assert_eq!(data["expires_in"], 3600);
    assert_eq!(data["organization_id"], tenant.organization_id);
    assert_eq!(data["environment_id"], tenant.environment_id);
    assert_eq!(data["user"]["id"], user.id);
    assert_eq!(data["user"]["email"], "ada@acme.test");
    assert!(data["user"].get("password_hash").is_none());

    let token = data["access_token"].as_str().unwrap();
    let response = get_auth(build(&pool), "/api/v1/workflows", token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_rejects_bad_credentials_uniformly(pool: PgPool) {
    let user = create_login_user(&pool, "ada@acme.test").await;
    create_tenant_for(&pool, user, "Acme").await;

    let wrong_password = login(build(&pool), "ada@acme.test", "incorrect").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password = body_json(wrong_password).await;

    let unknown_email = login(build(&pool), "nobody@acme.test", PASSWORD).await;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let unknown_email = body_json(unknown_email).await;

    assert_eq!(wrong_password["error"], unknown_email["error"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_without_organization_is_forbidden(pool: PgPool) {
    create_login_user(&pool, "loner@nowhere.test").await;

    let response = login(build(&pool), "loner@nowhere.test", PASSWORD).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Organization switch
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn switch_issues_token_for_member_organization(pool: PgPool) {
    let user = create_login_user(&pool, "ada@acme.test").await;
    let acme = create_tenant_for(&pool, user.clone(), "Acme").await;
    let globex = create_tenant_for(&pool, user, "Globex").await;

    let response = post_json_auth(
        build(&pool),
        &format!("/api/v1/auth/organizations/{}/switch", globex.organization_id),
        &acme.token(),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["organization_id"], globex.organization_id);
    assert_eq!(data["environment_id"], globex.environment_id);

    // The new token works against the other organization's workflows.
    let token = data["access_token"].as_str().unwrap();
    let response = post_json_auth(
        build(&pool),
        "/api/v1/workflows",
        token,
        json!({ "name": "Globex onboarding" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await["data"].clone();
    assert_eq!(created["notification_group_id"], globex.group_id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn switch_to_foreign_organization_is_unauthorized(pool: PgPool) {
    let acme = common::seed_tenant(&pool, "Acme").await;
    let globex = common::seed_tenant(&pool, "Globex").await;

    let response = post_json_auth(
        build(&pool),
        &format!("/api/v1/auth/organizations/{}/switch", globex.organization_id),
        &acme.token(),
        json!({}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        format!("Not authorized for organization {}", globex.organization_id)
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn switch_to_inactive_membership_is_unauthorized(pool: PgPool) {
    let user = create_login_user(&pool, "ada@acme.test").await;
    let acme = create_tenant_for(&pool, user.clone(), "Acme").await;
    let globex = create_tenant_for(&pool, user.clone(), "Globex").await;

    let member = MemberRepo::find_by_user_id(&pool, globex.organization_id, user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(MemberRepo::deactivate(&pool, member.id).await.unwrap());

    let response = post_json_auth(
        build(&pool),
        &format!("/api/v1/auth/organizations/{}/switch", globex.organization_id),
        &acme.token(),
        json!({}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn switch_requires_authentication(pool: PgPool) {
    let response = post_json(
        build(&pool),
        "/api/v1/auth/organizations/1/switch",
        json!({}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

fn build(pool: &PgPool) -> axum::Router {
    common::build_test_app(pool.clone())
}
