use notiflow_core::reconcile::UnmatchedStepPolicy;

use crate::auth::jwt::JwtConfig;
use crate::auth::provider::COMMUNITY_PROVIDER;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Name of the registered auth provider to use (default: `community`).
    pub auth_provider: String,
    /// What happens to control values of steps a workflow update drops.
    pub unmatched_step_policy: UnmatchedStepPolicy,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `AUTH_PROVIDER`         | `community`                |
    /// | `UNMATCHED_STEP_POLICY` | `skip`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let auth_provider = std::env::var("AUTH_PROVIDER")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| COMMUNITY_PROVIDER.into());

        let unmatched_step_policy: UnmatchedStepPolicy = std::env::var("UNMATCHED_STEP_POLICY")
            .unwrap_or_else(|_| UnmatchedStepPolicy::default().to_string())
            .parse()
            .expect("UNMATCHED_STEP_POLICY must be 'skip' or 'delete'");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            auth_provider,
            unmatched_step_policy,
            jwt,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
