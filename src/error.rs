//! Error codes shared by every error surfaced over HTTP.
//!
//! Each service error implements [`ErrorCode`]; routes convert them into an
//! [`ApiError`], which renders as `{ code, message, retryable }` JSON.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// Trait for errors that carry a machine-readable code.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// API ERROR
// =============================================================================

/// HTTP error response body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    /// Build an API error from any coded error.
    pub fn from_error(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { status, code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }

    #[must_use]
    pub fn not_found(what: &str) -> Self {
        Self { status: StatusCode::NOT_FOUND, code: "E_NOT_FOUND", message: format!("{what} not found"), retryable: false }
    }

    #[must_use]
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, code, message: message.into(), retryable: false }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}
