//! Scammer Error Types
//!
//! This module provides record-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::document::DocumentStoreError;
use thiserror::Error;

use crate::domain::entities::ValidationError;

/// Scammer-specific result type alias
pub type ScammerResult<T> = Result<T, ScammerError>;

/// Scammer-specific error variants
#[derive(Debug, Error)]
pub enum ScammerError {
    /// Record failed validation; every violated field is listed
    #[error("Validation failed ({} error(s))", .0.len())]
    Validation(Vec<ValidationError>),

    /// No record with this id
    #[error("Scammer not found")]
    NotFound,

    /// Id is not a valid identifier
    #[error("Invalid ID: {0}")]
    InvalidId(String),

    /// Another record already uses this email
    #[error("A scammer with this email already exists")]
    DuplicateEmail,

    /// Record store error
    #[error("Record store error: {0}")]
    Store(#[from] DocumentStoreError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScammerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScammerError::Validation(_) => ErrorKind::UnprocessableEntity,
            ScammerError::NotFound => ErrorKind::NotFound,
            ScammerError::InvalidId(_) => ErrorKind::BadRequest,
            ScammerError::DuplicateEmail => ErrorKind::Conflict,
            ScammerError::Store(e) if e.is_unavailable() => ErrorKind::ServiceUnavailable,
            ScammerError::Store(_) | ScammerError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            ScammerError::Validation(errors) => {
                AppError::unprocessable("Record validation failed")
                    .with_details(serde_json::json!({ "errors": errors }))
            }
            ScammerError::Store(e) if e.is_unavailable() => {
                AppError::service_unavailable("Record store unavailable")
            }
            ScammerError::Store(_) | ScammerError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ScammerError::Store(e) => {
                tracing::error!(error = %e, "Scammer store error");
            }
            ScammerError::Internal(msg) => {
                tracing::error!(message = %msg, "Scammer internal error");
            }
            ScammerError::Validation(errors) => {
                tracing::debug!(count = errors.len(), "Scammer record rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Scammer error");
            }
        }
    }
}

impl From<ScammerError> for AppError {
    fn from(err: ScammerError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for ScammerError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<serde_json::Error> for ScammerError {
    fn from(err: serde_json::Error) -> Self {
        ScammerError::Store(DocumentStoreError::Serialization(err))
    }
}

impl From<JsonRejection> for ScammerError {
    fn from(rejection: JsonRejection) -> Self {
        ScammerError::Validation(vec![ValidationError::new("body", rejection.body_text())])
    }
}
