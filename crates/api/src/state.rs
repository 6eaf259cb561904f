use std::sync::Arc;

use crate::auth::provider::AuthProvider;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and everything else sits
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: notiflow_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The auth provider resolved at startup.
    pub auth: Arc<dyn AuthProvider>,
}
