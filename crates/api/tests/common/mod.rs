#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use notiflow_api::auth::jwt::{generate_access_token, JwtConfig, TokenScope};
use notiflow_api::auth::provider::{AuthProviderRegistry, COMMUNITY_PROVIDER};
use notiflow_api::config::ServerConfig;
use notiflow_api::middleware::auth::AuthUser;
use notiflow_api::routes;
use notiflow_api::state::AppState;
use notiflow_core::reconcile::UnmatchedStepPolicy;
use notiflow_db::models::environment::CreateEnvironment;
use notiflow_db::models::member::CreateMember;
use notiflow_db::models::notification_group::CreateNotificationGroup;
use notiflow_db::models::organization::CreateOrganization;
use notiflow_db::models::user::{CreateUser, User};
use notiflow_db::repositories::{
    EnvironmentRepo, MemberRepo, NotificationGroupRepo, OrganizationRepo, UserRepo,
};
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Stored in place of a real hash for users that never log in.
pub const UNUSABLE_PASSWORD_HASH: &str = "!";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        auth_provider: COMMUNITY_PROVIDER.to_string(),
        unmatched_step_policy: UnmatchedStepPolicy::Skip,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the full application router with all middleware layers.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let auth = AuthProviderRegistry::with_builtins(pool.clone(), config.jwt.clone())
        .resolve(&config.auth_provider)
        .expect("community provider is built in");

    let state = AppState {
        pool,
        config: Arc::new(config),
        auth,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// An organization with one environment, its default group, and an admin user.
pub struct TestTenant {
    pub user: User,
    pub organization_id: i64,
    pub environment_id: i64,
    pub group_id: i64,
}

impl TestTenant {
    pub fn auth_user(&self) -> AuthUser {
        AuthUser {
            user_id: self.user.id,
            organization_id: self.organization_id,
            environment_id: self.environment_id,
            roles: vec!["admin".to_string()],
        }
    }

    pub fn token(&self) -> String {
        generate_access_token(
            &TokenScope {
                user_id: self.user.id,
                organization_id: self.organization_id,
                environment_id: self.environment_id,
                roles: vec!["admin".to_string()],
            },
            &test_config().jwt,
        )
        .expect("token generation should succeed")
    }
}

pub async fn create_user(pool: &PgPool, email: &str, password_hash: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            first_name: Some("Test".to_string()),
            last_name: None,
            password_hash: password_hash.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Create an organization with a `Development` environment and a `General`
/// notification group, and make `user` an admin member of it.
pub async fn create_tenant_for(pool: &PgPool, user: User, org_name: &str) -> TestTenant {
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
    MemberRepo::create(
        pool,
        &CreateMember {
            organization_id: org.id,
            user_id: user.id,
            roles: vec!["admin".to_string()],
        },
    )
    .await
    .unwrap();

    TestTenant {
        user,
        organization_id: org.id,
        environment_id: env.id,
        group_id: group.id,
    }
}

/// A fresh user in a fresh organization.
pub async fn seed_tenant(pool: &PgPool, org_name: &str) -> TestTenant {
    let email = format!("owner@{}.test", org_name.to_lowercase());
    let user = create_user(pool, &email, UNUSABLE_PASSWORD_HASH).await;
    create_tenant_for(pool, user, org_name).await
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
