pub mod auth;
pub mod health;
pub mod workflows;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                              login (public)
/// /auth/organizations/{id}/switch          switch organization
///
/// /workflows                               list, create
/// /workflows/{id}                          get, update, delete
/// /workflows/{id}/preferences              get, replace
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/workflows", workflows::router())
}
