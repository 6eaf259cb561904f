//! HTTP error mapping.
//!
//! Use-cases fail with [`CoreError`] for domain outcomes and bubble sqlx
//! errors up unchanged. Both are rendered here as `{ "error", "code" }`
//! bodies; internal details are logged and never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use notiflow_core::error::CoreError;
use serde::Serialize;

/// Application-level error type for handlers and use-cases.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `notiflow_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A malformed request rejected before reaching a use-case.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A failure with no client-facing explanation.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler and use-case return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::from(errors))
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl ErrorBody {
    fn new(code: &'static str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }

    fn internal() -> Self {
        Self::new("INTERNAL_ERROR", "An internal error occurred")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Core(core) => core_error_parts(core),
            AppError::Database(err) => database_error_parts(err),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new("BAD_REQUEST", msg.as_str()))
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
            }
        };
        (status, Json(body)).into_response()
    }
}

fn core_error_parts(err: &CoreError) -> (StatusCode, ErrorBody) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            ErrorBody::new("NOT_FOUND", format!("{entity} with id {id} not found")),
        ),
        CoreError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            ErrorBody::new("VALIDATION_ERROR", msg.as_str()),
        ),
        CoreError::BadRequest(msg) => {
            (StatusCode::BAD_REQUEST, ErrorBody::new("BAD_REQUEST", msg.as_str()))
        }
        CoreError::Unauthorized(msg) => (
            StatusCode::UNAUTHORIZED,
            ErrorBody::new("UNAUTHORIZED", msg.as_str()),
        ),
        CoreError::Forbidden(msg) => {
            (StatusCode::FORBIDDEN, ErrorBody::new("FORBIDDEN", msg.as_str()))
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Workflow invariant violated");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
        }
        CoreError::Platform(msg) => {
            tracing::error!(error = %msg, "Platform error");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
        }
    }
}

/// Unique constraints whose violation means the caller sent a duplicate,
/// with the message reported for each.
const DUPLICATE_CONSTRAINTS: &[(&str, &str)] = &[(
    "uq_notification_templates_environment_trigger",
    "Workflow with this trigger identifier already exists",
)];

/// Classify a sqlx error.
///
/// - `RowNotFound` maps to 404.
/// - A workflow trigger-identifier violation is the same duplicate the
///   upsert check reports, so it maps to 400 like that check.
/// - Other `uq_*` violations map to 409; foreign key violations to 400.
/// - Everything else is a sanitized 500.
fn database_error_parts(err: &sqlx::Error) -> (StatusCode, ErrorBody) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            ErrorBody::new("NOT_FOUND", "Resource not found"),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => {
                    if let Some((_, msg)) =
                        DUPLICATE_CONSTRAINTS.iter().find(|(name, _)| *name == constraint)
                    {
                        return (StatusCode::BAD_REQUEST, ErrorBody::new("BAD_REQUEST", *msg));
                    }
                    if constraint.starts_with("uq_") {
                        return (
                            StatusCode::CONFLICT,
                            ErrorBody::new(
                                "CONFLICT",
                                format!("Duplicate value violates unique constraint: {constraint}"),
                            ),
                        );
                    }
                }
                // foreign_key_violation
                Some("23503") => {
                    return (
                        StatusCode::BAD_REQUEST,
                        ErrorBody::new(
                            "BAD_REQUEST",
                            format!("Referenced record does not exist: {constraint}"),
                        ),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
        }
    }
}
