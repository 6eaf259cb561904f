//! Route definitions for the `/workflows` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{preferences, workflows};
use crate::state::AppState;

/// Routes mounted at `/workflows`.
///
/// ```text
/// GET    /                    -> list_workflows
/// POST   /                    -> create_workflow
/// GET    /{id}                -> get_workflow
/// PUT    /{id}                -> update_workflow
/// DELETE /{id}                -> delete_workflow
/// GET    /{id}/preferences    -> get_preferences
/// PUT    /{id}/preferences    -> upsert_preferences
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(workflows::list_workflows).post(workflows::create_workflow),
        )
        .route(
            "/{id}",
            get(workflows::get_workflow)
                .put(workflows::update_workflow)
                .delete(workflows::delete_workflow),
        )
        .route(
            "/{id}/preferences",
            get(preferences::get_preferences).put(preferences::upsert_preferences),
        )
}
