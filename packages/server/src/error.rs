use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `CONFLICT`,
    /// `NOT_AUTHENTICATED`, `SESSION_INVALID`, `INVALID_CREDENTIALS`, `CSRF_FAILED`,
    /// `NOT_FOUND`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Passwords do not match")]
    pub message: String,
    /// Per-field messages for request validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = json!({"password_confirm": ["Passwords do not match"]}))]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

/// Field-level validation messages collected while checking a request body.
#[derive(Debug, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(())` when nothing was recorded, otherwise `AppError::InvalidFields`.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidFields(self))
        }
    }
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    InvalidFields(FieldErrors),
    /// A uniqueness rule was violated (duplicate username, application, review...).
    Conflict(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    CsrfFailed,
    /// Missing resources and resources owned by someone else both map here.
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let (status, code, message, fields) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg, None),
            AppError::InvalidFields(FieldErrors(fields)) => {
                let message = fields
                    .iter()
                    .next()
                    .and_then(|(_, msgs)| msgs.first().cloned())
                    .unwrap_or_else(|| "Invalid request".into());
                (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    message,
                    Some(fields),
                )
            }
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, "CONFLICT", msg, None),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                "NOT_AUTHENTICATED",
                "Authentication required".into(),
                None,
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                "SESSION_INVALID",
                "Session is invalid or has expired".into(),
                None,
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid username or password".into(),
                None,
            ),
            AppError::CsrfFailed => (
                StatusCode::FORBIDDEN,
                "CSRF_FAILED",
                "CSRF token missing or incorrect".into(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".into(),
                    None,
                )
            }
        };
        (
            status,
            ErrorBody {
                code,
                message,
                fields,
            },
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::SizeLimitExceeded { .. } | StorageError::InvalidKey(_) => {
                AppError::Validation(err.to_string())
            }
            StorageError::NotFound(_) => AppError::NotFound("File not found".into()),
            StorageError::Io(e) => AppError::Internal(format!("Storage IO error: {e}")),
        }
    }
}

/// Map a unique-constraint violation on insert/update to `Conflict(message)`.
pub fn conflict_on_unique(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!(%detail, "Unique constraint rejected write");
            AppError::Conflict(message.to_string())
        }
        _ => AppError::from(err),
    }
}
