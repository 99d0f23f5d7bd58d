//! JSON error envelope returned by every API handler.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Body of `{"error": ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub details: Vec<serde_json::Value>,
    pub trace_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Error, Debug)]
pub enum AppError {
    /// A write the data model refuses, such as deleting a category that still has books.
    #[error("constraint violation: {message}")]
    ConstraintViolation {
        message: String,
        details: Vec<serde_json::Value>,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn constraint_violation(
        details: Vec<serde_json::Value>,
        message: impl Into<String>,
    ) -> Self {
        Self::ConstraintViolation {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ConstraintViolation { .. } | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code placed in the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ConstraintViolation { .. } => "constraint_violation",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) => "internal_error",
        }
    }

    fn into_parts(self) -> (String, Vec<serde_json::Value>) {
        match self {
            AppError::ConstraintViolation { message, details } => (message, details),
            AppError::NotFound(message) | AppError::BadRequest(message) => (message, Vec::new()),
            AppError::Internal(e) => (format!("{:#}", e), Vec::new()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let trace_id = Uuid::now_v7();
        let status = self.status();
        let code = self.code();
        let (message, details) = self.into_parts();

        if status.is_server_error() {
            tracing::error!(%trace_id, code, status = status.as_u16(), error = %message, "request failed");
        } else {
            tracing::warn!(%trace_id, code, status = status.as_u16(), %message, "request rejected");
        }

        // release builds never echo internal causes
        let message = if cfg!(not(debug_assertions)) && status.is_server_error() {
            "An internal server error occurred".to_string()
        } else {
            message
        };

        let envelope = ErrorEnvelope {
            error: ErrorBody {
                code,
                message,
                details,
                trace_id: trace_id.to_string(),
                timestamp: OffsetDateTime::now_utc().to_string(),
            },
        };

        (status, Json(envelope)).into_response()
    }
}
