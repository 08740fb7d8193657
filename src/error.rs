//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// One or more request fields missing or invalid. Always raised before any
    /// store access; every failed field is listed.
    #[error("invalid request: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("account {0} not found")]
    AccountNotFound(i64),

    #[error("operation {0} not found")]
    OperationNotFound(i64),

    #[error("an account with this document already exists")]
    DocumentTaken,

    /// Business-rule rejection: the charge would drive the account limit
    /// negative. Not a system fault.
    #[error("account limit exceeded, operation not allowed")]
    LimitExceeded,

    /// A concurrent writer changed the account limit between our read and our
    /// write. The posting workflow retries a bounded number of times before
    /// surfacing this.
    #[error("concurrent limit update detected")]
    LimitConflict,

    #[error("posting deadline exceeded")]
    DeadlineExceeded,

    // Server errors (5xx)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::Validation(failures) => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                Some(failures.join("; ")),
            ),
            AppError::LimitExceeded => (StatusCode::BAD_REQUEST, "limit_exceeded", None),

            // 404 Not Found
            AppError::AccountNotFound(id) => {
                (StatusCode::NOT_FOUND, "account_not_found", Some(id.to_string()))
            }
            AppError::OperationNotFound(id) => {
                (StatusCode::NOT_FOUND, "operation_not_found", Some(id.to_string()))
            }

            // 409 Conflict
            AppError::DocumentTaken => (StatusCode::CONFLICT, "document_taken", None),
            AppError::LimitConflict => (StatusCode::CONFLICT, "limit_conflict", None),

            // 504 Gateway Timeout
            AppError::DeadlineExceeded => {
                (StatusCode::GATEWAY_TIMEOUT, "deadline_exceeded", None)
            }

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
