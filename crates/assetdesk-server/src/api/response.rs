//! API response types
//!
//! Every endpoint answers with the same envelope:
//! `{"success": true, "data": ..., "meta": ...}` or
//! `{"success": false, "error": {"code": ..., "message": ...}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::store::StoreError;

/// Standard success response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: None,
        }
    }

    pub fn success_with_meta(data: T, meta: serde_json::Value) -> Self {
        Self {
            success: true,
            data,
            meta: Some(meta),
        }
    }

    /// Respond with a status other than 200
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

pub fn validation_error(message: impl Into<String>) -> Response {
    ErrorResponse::new("VALIDATION_ERROR", message).with_status(StatusCode::BAD_REQUEST)
}

pub fn not_found(message: impl Into<String>) -> Response {
    ErrorResponse::new("NOT_FOUND", message).with_status(StatusCode::NOT_FOUND)
}

pub fn conflict(message: impl Into<String>) -> Response {
    ErrorResponse::new("CONFLICT", message).with_status(StatusCode::CONFLICT)
}

/// Generic 500; the detail only goes to the log
pub fn internal_error(context: &str, err: &dyn std::fmt::Display) -> Response {
    tracing::error!(error = %err, "{}", context);
    ErrorResponse::new("INTERNAL_ERROR", "A database error occurred")
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Status mapping for store errors that reach a handler unclassified
pub fn store_error_response(context: &str, err: &StoreError) -> Response {
    match err {
        StoreError::NotFound { .. } => not_found(err.to_string()),
        StoreError::Validation(message) => validation_error(message.clone()),
        StoreError::Conflict(message) => conflict(message.clone()),
        StoreError::Corrupt(_) | StoreError::Database(_) => internal_error(context, err),
    }
}
