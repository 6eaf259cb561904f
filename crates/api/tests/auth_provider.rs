//! Auth provider registry resolution and provider substitution.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use axum::http::StatusCode;
use common::{body_json, get, test_config};
use notiflow_api::auth::jwt::{Claims, TokenScope};
use notiflow_api::auth::provider::{AuthProvider, AuthProviderRegistry, COMMUNITY_PROVIDER};
use notiflow_api::error::{AppError, AppResult};
use notiflow_api::routes;
use notiflow_api::state::AppState;
use notiflow_core::error::CoreError;
use notiflow_core::types::DbId;
use notiflow_db::models::environment::Environment;
use notiflow_db::models::member::Member;
use notiflow_db::models::organization::Organization;
use notiflow_db::models::user::User;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Provider that knows nobody and rejects every token.
struct ClosedProvider;

#[async_trait]
impl AuthProvider for ClosedProvider {
    fn name(&self) -> &str {
        "closed"
    }

    fn token_ttl_secs(&self) -> i64 {
        60
    }

    fn sign_token(&self, _scope: &TokenScope) -> AppResult<String> {
        Err(AppError::Core(CoreError::Forbidden("closed".into())))
    }

    fn verify_token(&self, _token: &str) -> AppResult<Claims> {
        Err(AppError::Core(CoreError::Unauthorized("closed".into())))
    }

    async fn find_user(&self, _user_id: DbId) -> AppResult<Option<User>> {
        Ok(None)
    }

    async fn find_user_by_email(&self, _email: &str) -> AppResult<Option<User>> {
        Ok(None)
    }

    async fn find_member(
        &self,
        _organization_id: DbId,
        _user_id: DbId,
    ) -> AppResult<Option<Member>> {
        Ok(None)
    }

    async fn list_user_organizations(&self, _user_id: DbId) -> AppResult<Vec<Organization>> {
        Ok(Vec::new())
    }

    async fn find_development_environment(
        &self,
        _organization_id: DbId,
    ) -> AppResult<Option<Environment>> {
        Ok(None)
    }

    async fn is_authenticated_for_organization(
        &self,
        _user_id: DbId,
        _organization_id: DbId,
    ) -> AppResult<bool> {
        Ok(false)
    }
}

fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unused")
        .expect("lazy pool should build")
}

#[tokio::test]
async fn builtins_resolve_the_community_provider() {
    let registry = AuthProviderRegistry::with_builtins(lazy_pool(), test_config().jwt);

    let provider = registry.resolve(COMMUNITY_PROVIDER).unwrap();

    assert_eq!(provider.name(), "community");
    assert_eq!(provider.token_ttl_secs(), 3600);
}

#[tokio::test]
async fn unknown_provider_is_a_platform_error() {
    let registry = AuthProviderRegistry::with_builtins(lazy_pool(), test_config().jwt);

    let err = registry.resolve("enterprise").err();

    assert_matches!(
        err,
        Some(CoreError::Platform(msg)) if msg.contains("'enterprise'") && msg.contains("community")
    );
}

#[tokio::test]
async fn community_tokens_round_trip() {
    let registry = AuthProviderRegistry::with_builtins(lazy_pool(), test_config().jwt);
    let provider = registry.resolve(COMMUNITY_PROVIDER).unwrap();

    let token = provider
        .sign_token(&TokenScope {
            user_id: 7,
            organization_id: 3,
            environment_id: 5,
            roles: vec!["admin".to_string()],
        })
        .unwrap();
    let claims = provider.verify_token(&token).unwrap();

    assert_eq!(claims.sub, 7);
    assert_eq!(claims.organization_id, 3);
    assert_eq!(claims.environment_id, 5);
    assert_matches!(
        provider.verify_token("garbage"),
        Err(AppError::Core(CoreError::Unauthorized(_)))
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn registered_provider_replaces_token_handling(pool: PgPool) {
    let mut registry = AuthProviderRegistry::with_builtins(pool.clone(), test_config().jwt);
    registry.register(Arc::new(ClosedProvider));
    let auth = registry.resolve("closed").unwrap();

    let app = axum::Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .with_state(AppState {
            pool: pool.clone(),
            config: Arc::new(test_config()),
            auth,
        });

    let tenant = common::seed_tenant(&pool, "Acme").await;
    let response = common::get_auth(app.clone(), "/api/v1/workflows", &tenant.token()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(app, "/health").await;
    assert_eq!(body_json(response).await["auth_provider"], "closed");
}
