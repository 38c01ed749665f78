use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::apify::UpstreamError;

/// The forwarding operation an upstream failure happened in. Decides which
/// upstream statuses are surfaced and with which message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListActors,
    FetchSchema,
    ExecuteRun,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListActors => "list_actors",
            Operation::FetchSchema => "fetch_schema",
            Operation::ExecuteRun => "execute_run",
        }
    }

    fn unauthorized_message(&self) -> &'static str {
        match self {
            Operation::ListActors => "Invalid API key",
            Operation::FetchSchema | Operation::ExecuteRun => {
                "Invalid API key or unauthorized access"
            }
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Operation::ListActors => "Failed to fetch actors",
            Operation::FetchSchema => "Failed to fetch actor schema",
            Operation::ExecuteRun => "Failed to execute actor run",
        }
    }
}

/// Errors returned to the browser as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API key is required")]
    MissingCredential,

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Map an upstream failure for `op`. The cause is logged, not returned.
    pub fn upstream(op: Operation, err: &UpstreamError) -> Self {
        error!(operation = op.as_str(), error = %err, "upstream call failed");

        if err.is_unauthorized() {
            return ApiError::Unauthorized(op.unauthorized_message());
        }
        match op {
            Operation::FetchSchema if err.is_not_found() => ApiError::NotFound("Actor not found"),
            Operation::ExecuteRun if err.is_bad_request() => {
                ApiError::BadRequest("Invalid input data")
            }
            _ => ApiError::Internal(op.failure_message()),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCredential | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}
