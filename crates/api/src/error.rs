use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fgvistos_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `fgvistos_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An upstream service (payment gateway, object storage) failed.
    #[error("Upstream error: {0}")]
    BadGateway(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Status, stable machine code and client-facing message of an error.
type ErrorParts = (StatusCode, &'static str, String);

/// Generic 500. The detail goes to the log, never to the client.
fn internal(detail: &dyn std::fmt::Display, context: &str) -> ErrorParts {
    tracing::error!(error = %detail, "{context}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl AppError {
    fn parts(&self) -> ErrorParts {
        match self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::BadGateway(msg) => {
                tracing::error!(error = %msg, "Upstream service error");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "An upstream service failed".to_string(),
                )
            }
            AppError::InternalError(msg) => internal(msg, "Internal error"),
        }
    }
}

fn core_parts(err: &CoreError) -> ErrorParts {
    let (status, code) = match err {
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        CoreError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        CoreError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        CoreError::Internal(msg) => return internal(msg, "Internal core error"),
    };
    let message = match err {
        CoreError::NotFound { entity, id } => format!("{entity} with id {id} not found"),
        CoreError::Validation(msg)
        | CoreError::Conflict(msg)
        | CoreError::Unauthorized(msg)
        | CoreError::Forbidden(msg)
        | CoreError::Internal(msg) => msg.clone(),
    };
    (status, code, message)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = json!({
            "error": message,
            "code": code,
            "status": status.as_u16(),
        });
        (status, axum::Json(body)).into_response()
    }
}

/// Map a sqlx error onto the HTTP envelope.
///
/// Missing rows are 404, named `uq_*` violations 409 and foreign key
/// violations 400. Anything else is logged and hidden behind a 500.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    let db_err = match err {
        sqlx::Error::RowNotFound => {
            return (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            )
        }
        sqlx::Error::Database(db_err) => db_err,
        other => return internal(other, "Database error"),
    };

    match (db_err.code().as_deref(), db_err.constraint()) {
        (Some("23505"), Some(constraint)) if constraint.starts_with("uq_") => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates unique constraint: {constraint}"),
        ),
        (Some("23503"), _) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Referenced resource does not exist".to_string(),
        ),
        _ => internal(db_err, "Database error"),
    }
}
