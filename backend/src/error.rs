//! Error handling for the bakery inventory backend
//!
//! Every failure is caught at the operation boundary and turned into a
//! notification-shaped JSON body. `level` tells the front end which kind of
//! toast to show.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use shared::reorder::ReorderStep;
use shared::types::NoticeLevel;
use shared::validation::ValidationError;
use thiserror::Error;

use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Store connectivity
    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Duplicate entry: {message}")]
    DuplicateEntry { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Multi-write operations
    #[error("Batch write incomplete, {} writes failed", .failed.len())]
    PartialBatch {
        committed: Vec<String>,
        failed: Vec<String>,
    },

    #[error("Failed to move {item_name}: {message}")]
    ReorderFailed {
        item_name: String,
        committed: Vec<ReorderStep>,
        message: String,
    },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
            StoreError::OrderingUnavailable(collection) => {
                AppError::StoreUnavailable(format!("ordered fetch of {}", collection))
            }
            StoreError::PermissionDenied(msg) => AppError::PermissionDenied(msg),
            StoreError::NotFound { collection, id } => {
                AppError::NotFound(format!("{} document {}", collection, id))
            }
            StoreError::InvalidDocument => {
                AppError::Internal("document body must be a JSON object".to_string())
            }
            StoreError::Database(e) => AppError::DatabaseError(e),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        if err.duplicate {
            AppError::DuplicateEntry {
                field: err.field,
                message: err.message,
            }
        } else {
            AppError::Validation {
                field: err.field,
                message: err.message,
            }
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub level: NoticeLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorDetail {
    fn new(code: &str, message: impl Into<String>, level: NoticeLevel) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            level,
            field: None,
            details: None,
        }
    }

    fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::StoreUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail::new(
                    "STORE_UNAVAILABLE",
                    "Could not reach the database. Please try again.",
                    NoticeLevel::Error,
                ),
            ),
            AppError::PermissionDenied(_) => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "PERMISSION_DENIED",
                    "Permission denied by the database",
                    NoticeLevel::Error,
                ),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", message.clone(), NoticeLevel::Warning)
                    .with_field(field),
            ),
            AppError::DuplicateEntry { field, message } => (
                StatusCode::CONFLICT,
                ErrorDetail::new("DUPLICATE_ENTRY", message.clone(), NoticeLevel::Warning)
                    .with_field(field),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource), NoticeLevel::Error),
            ),
            AppError::PartialBatch { committed, failed } => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new(
                    "PARTIAL_BATCH_FAILURE",
                    format!(
                        "Error saving data: {} of {} writes failed",
                        failed.len(),
                        committed.len() + failed.len()
                    ),
                    NoticeLevel::Error,
                )
                .with_details(json!({ "committed": committed, "failed": failed })),
            ),
            AppError::ReorderFailed {
                item_name,
                committed,
                message,
            } => (
                StatusCode::BAD_GATEWAY,
                ErrorDetail::new(
                    "REORDER_FAILED",
                    format!("Failed to move {}: {}", item_name, message),
                    NoticeLevel::Error,
                )
                .with_details(json!({ "committed": committed })),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred", NoticeLevel::Error),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone(), NoticeLevel::Error),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "INTERNAL_ERROR",
                    "An internal server error occurred",
                    NoticeLevel::Error,
                ),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
