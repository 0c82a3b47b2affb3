use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::services::mailer::DispatchError;
use crate::store::StoreError;

pub type AttendanceResult<T> = Result<T, AttendanceError>;

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A storage uniqueness constraint rejected the write; retry with fresh state.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("report dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("storage error: {0}")]
    Storage(#[source] sqlx::Error),
}

impl AttendanceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }
}

impl From<StoreError> for AttendanceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Constraint(detail) => AttendanceError::Conflict(detail),
            StoreError::Database(e) => AttendanceError::Storage(e),
        }
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::NotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::Forbidden(_) => StatusCode::FORBIDDEN,
            AttendanceError::Conflict(_) => StatusCode::CONFLICT,
            AttendanceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AttendanceError::Dispatch(_) => StatusCode::BAD_GATEWAY,
            AttendanceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AttendanceError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure");
                "Internal Server Error".to_string()
            }
            AttendanceError::Dispatch(e) => {
                tracing::error!(error = %e, "Report dispatch failure");
                "Failed to send the report".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
