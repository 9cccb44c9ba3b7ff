//! API error handling.
//!
//! Maps [`crate::Error`] onto HTTP status codes and a JSON body of the form
//! `{ "code", "message", "details" }`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Error;

/// API error structure for JSON responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Option<serde_json::Value>) -> Self {
        self.details = details;
        self
    }
}

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    pub status: StatusCode,
    pub error: ApiError,
}

impl ApiErrorResponse {
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", message))
    }

    #[must_use]
    pub fn unprocessable(message: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::new("VALIDATION_ERROR", message).with_details(details),
        )
    }

    /// Creates a 500 response; the cause is logged, never sent.
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", "An internal error occurred"),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<Error> for ApiErrorResponse {
    fn from(error: Error) -> Self {
        let details = error.details();
        match error {
            Error::NotFound { .. } => Self::new(
                StatusCode::NOT_FOUND,
                ApiError::new("NOT_FOUND", error.to_string()).with_details(details),
            ),
            Error::Gone { .. } => Self::new(
                StatusCode::GONE,
                ApiError::new("GONE", error.to_string()).with_details(details),
            ),
            Error::Validation(_) => Self::unprocessable(error.to_string(), details),
            Error::InvalidArgument(message) => Self::bad_request(message),
            Error::LockFailed(path) => {
                tracing::warn!(lock = %path.display(), "data lock busy, answering 503");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    ApiError::new("LOCK_TIMEOUT", "Task store is busy, retry later"),
                )
            }
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::InvalidConfig(_)
            | Error::OperationFailed(_) => {
                tracing::error!(%error, "internal error");
                Self::internal_error()
            }
        }
    }
}

impl From<JsonRejection> for ApiErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        let message = rejection.body_text();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            Self::unprocessable(
                "Request body does not match the expected shape",
                Some(json!({ "message": message })),
            )
        } else {
            Self::bad_request(message)
        }
    }
}

impl From<PathRejection> for ApiErrorResponse {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(format!(
            "task id must be a positive integer: {}",
            rejection.body_text()
        ))
    }
}
