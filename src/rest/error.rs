//! API error types and responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::backend::BackendError;
use crate::refund::validation::ValidationError;
use crate::refund::LookupErrorCode;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found
    NotFound(String),
    /// Step input failed validation
    ValidationError(String),
    /// Malformed request
    BadRequest(String),
    /// Transition attempted on a step that isn't reachable yet
    InvalidStep(String),
    /// A backend call for the session is still in flight
    SessionBusy(String),
    /// Session lacks what submission needs
    NotSubmittable(String),
    /// Email lookup refused the pass holder
    LookupRejected {
        code: LookupErrorCode,
        message: String,
    },
    /// Backend answered but declined the submission
    SubmissionFailed(String),
    /// Backend unreachable or misbehaving
    Upstream(String),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::InvalidStep(msg) => (StatusCode::CONFLICT, "invalid_step", msg),
            ApiError::SessionBusy(msg) => (StatusCode::CONFLICT, "session_busy", msg),
            ApiError::NotSubmittable(msg) => (StatusCode::CONFLICT, "not_submittable", msg),
            ApiError::LookupRejected { code, message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, code.as_str(), message)
            }
            ApiError::SubmissionFailed(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "submission_failed", msg)
            }
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg),
        };

        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl From<BackendError> for ApiError {
    fn from(err: BackendError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}
