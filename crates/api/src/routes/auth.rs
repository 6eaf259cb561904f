//! Route definitions for the `/auth` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /login                        -> login
/// POST /organizations/{id}/switch    -> switch_organization (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route(
            "/organizations/{id}/switch",
            post(auth::switch_organization),
        )
}
