//! HTTP error mapping. Every failure leaves the API as
//! `{"detail": <message>, "code": <CODE>}`.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use robofleet_core::error::CoreError;
use serde::Serialize;

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Logged in full; the client only sees a generic message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
    code: &'static str,
}

impl ErrorBody {
    fn new(code: &'static str, detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code,
        }
    }

    fn internal() -> Self {
        Self::new("INTERNAL_ERROR", "An internal error occurred")
    }
}

impl AppError {
    fn status_and_body(&self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Core(core) => core_status_and_body(core),
            AppError::Database(err) => sqlx_status_and_body(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new("BAD_REQUEST", msg)),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], Json(body)).into_response();
        }
        (status, Json(body)).into_response()
    }
}

fn core_status_and_body(err: &CoreError) -> (StatusCode, ErrorBody) {
    match err {
        CoreError::NotFound { entity, .. } => (
            StatusCode::NOT_FOUND,
            ErrorBody::new("NOT_FOUND", format!("{entity} not found")),
        ),
        CoreError::Validation(msg) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorBody::new("VALIDATION_ERROR", msg),
        ),
        CoreError::InvalidState(msg) => {
            (StatusCode::BAD_REQUEST, ErrorBody::new("INVALID_STATE", msg))
        }
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, ErrorBody::new("CONFLICT", msg)),
        CoreError::Unauthorized(msg) => {
            (StatusCode::UNAUTHORIZED, ErrorBody::new("UNAUTHORIZED", msg))
        }
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorBody::new("FORBIDDEN", msg)),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
        }
    }
}

/// `RowNotFound` is a 404 and a `uq_*` unique violation a 409. Anything
/// else is a sanitized 500.
fn sqlx_status_and_body(err: &sqlx::Error) -> (StatusCode, ErrorBody) {
    if matches!(err, sqlx::Error::RowNotFound) {
        return (
            StatusCode::NOT_FOUND,
            ErrorBody::new("NOT_FOUND", "Resource not found"),
        );
    }
    if let Some(constraint) = violated_unique_constraint(err).filter(|c| c.starts_with("uq_")) {
        return (
            StatusCode::CONFLICT,
            ErrorBody::new(
                "CONFLICT",
                format!("Duplicate value violates unique constraint: {constraint}"),
            ),
        );
    }
    tracing::error!(error = %err, "Database error");
    (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::internal())
}

fn violated_unique_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            db_err.constraint()
        }
        _ => None,
    }
}

/// Whether `err` is a unique violation of `constraint`. Handlers use it to
/// report a lost insert race the same way as the pre-insert lookup.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    violated_unique_constraint(err) == Some(constraint)
}
