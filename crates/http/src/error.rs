//! Error handling for the bookstall HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Message returned for every internal error; the detail is only logged.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

pub const REQUEST_TIMEOUT_MESSAGE: &str = "Request timed out";

/// Application error types that map to HTTP responses
///
/// Every variant renders as `{"error": "<message>"}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Status code this error renders with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Render the `{"error": ...}` body shared by all error responses.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::now_v7();
        let status = self.status();

        match self {
            AppError::BadRequest { message, code } | AppError::NotFound { message, code } => {
                tracing::warn!(
                    error_id = %error_id,
                    error_code = %code,
                    status_code = %status.as_u16(),
                    message = %message,
                    "request rejected"
                );
                error_response(status, &message)
            }
            AppError::Internal(e) => {
                tracing::error!(
                    error_id = %error_id,
                    error_code = "internal_error",
                    status_code = %status.as_u16(),
                    error = ?e,
                    "request failed"
                );
                error_response(status, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}
