//! Pluggable authentication provider.
//!
//! An [`AuthProvider`] bundles everything the API needs from an auth backend:
//! token signing and verification, user / member / organization lookups, and
//! the organization-access check. Providers are registered by name in an
//! [`AuthProviderRegistry`]; the one named by `AUTH_PROVIDER` is resolved
//! once at startup and stored in `AppState`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use notiflow_core::error::CoreError;
use notiflow_core::types::DbId;
use notiflow_db::models::environment::Environment;
use notiflow_db::models::member::Member;
use notiflow_db::models::organization::Organization;
use notiflow_db::models::user::User;
use notiflow_db::repositories::{EnvironmentRepo, MemberRepo, OrganizationRepo, UserRepo};
use notiflow_db::DbPool;

use crate::auth::jwt::{generate_access_token, validate_token, Claims, JwtConfig, TokenScope};
use crate::error::{AppError, AppResult};

/// Name of the built-in provider backed by Postgres and HS256 tokens.
pub const COMMUNITY_PROVIDER: &str = "community";

/// Capabilities an authentication backend must provide.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Registry name of the provider.
    fn name(&self) -> &str;

    /// Lifetime of issued tokens in seconds.
    fn token_ttl_secs(&self) -> i64;

    /// Sign an access token for the given scope.
    fn sign_token(&self, scope: &TokenScope) -> AppResult<String>;

    /// Verify a bearer token and return its claims.
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    async fn find_user(&self, user_id: DbId) -> AppResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_member(&self, organization_id: DbId, user_id: DbId)
        -> AppResult<Option<Member>>;

    /// Organizations the user belongs to, oldest membership first.
    async fn list_user_organizations(&self, user_id: DbId) -> AppResult<Vec<Organization>>;

    /// The environment new tokens for an organization are scoped to.
    async fn find_development_environment(
        &self,
        organization_id: DbId,
    ) -> AppResult<Option<Environment>>;

    /// Whether the user may act within the organization.
    async fn is_authenticated_for_organization(
        &self,
        user_id: DbId,
        organization_id: DbId,
    ) -> AppResult<bool>;
}

// ---------------------------------------------------------------------------
// Community provider
// ---------------------------------------------------------------------------

/// Provider backed by the Postgres repositories and HS256 JWTs.
pub struct CommunityAuthProvider {
    pool: DbPool,
    jwt: JwtConfig,
}

impl CommunityAuthProvider {
    pub fn new(pool: DbPool, jwt: JwtConfig) -> Self {
        Self { pool, jwt }
    }
}

#[async_trait]
impl AuthProvider for CommunityAuthProvider {
    fn name(&self) -> &str {
        COMMUNITY_PROVIDER
    }

    fn token_ttl_secs(&self) -> i64 {
        self.jwt.access_token_expiry_mins * 60
    }

    fn sign_token(&self, scope: &TokenScope) -> AppResult<String> {
        generate_access_token(scope, &self.jwt)
            .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        validate_token(token, &self.jwt)
            .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))
    }

    async fn find_user(&self, user_id: DbId) -> AppResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, user_id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(UserRepo::find_by_email(&self.pool, email).await?)
    }

    async fn find_member(
        &self,
        organization_id: DbId,
        user_id: DbId,
    ) -> AppResult<Option<Member>> {
        Ok(MemberRepo::find_by_user_id(&self.pool, organization_id, user_id).await?)
    }

    async fn list_user_organizations(&self, user_id: DbId) -> AppResult<Vec<Organization>> {
        Ok(OrganizationRepo::list_for_user(&self.pool, user_id).await?)
    }

    async fn find_development_environment(
        &self,
        organization_id: DbId,
    ) -> AppResult<Option<Environment>> {
        Ok(EnvironmentRepo::find_first_for_organization(&self.pool, organization_id).await?)
    }

    async fn is_authenticated_for_organization(
        &self,
        user_id: DbId,
        organization_id: DbId,
    ) -> AppResult<bool> {
        let member = MemberRepo::find_by_user_id(&self.pool, organization_id, user_id).await?;
        Ok(member.is_some_and(|m| m.is_active()))
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Named auth providers available to this build.
pub struct AuthProviderRegistry {
    providers: HashMap<String, Arc<dyn AuthProvider>>,
}

impl AuthProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Registry holding the providers compiled into this build.
    pub fn with_builtins(pool: DbPool, jwt: JwtConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CommunityAuthProvider::new(pool, jwt)));
        registry
    }

    /// Register a provider under its own name, replacing any previous one.
    pub fn register(&mut self, provider: Arc<dyn AuthProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn AuthProvider>> {
        self.providers.get(name).cloned()
    }

    /// Resolve the configured provider. An unknown name is a platform error.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn AuthProvider>, CoreError> {
        self.get(name).ok_or_else(|| {
            let mut known: Vec<&str> = self.providers.keys().map(String::as_str).collect();
            known.sort_unstable();
            CoreError::Platform(format!(
                "Auth provider '{name}' is not registered (available: {})",
                known.join(", ")
            ))
        })
    }
}

impl Default for AuthProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
