//! Axum-specific error types and mappings.
//!
//! Maps `CoreError` onto HTTP status codes and JSON error bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pkgstore_core::{CoreError, ProcessError};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Another stream already owns the package.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Service unavailable (package manager missing or failing).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(msg)
            | Self::Conflict(msg)
            | Self::ServiceUnavailable(msg)
            | Self::Internal(msg) => msg,
        };

        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %message, "request failed");
        }

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for HttpError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Process(proc_err) => proc_err.into(),
            CoreError::Validation(e) => Self::BadRequest(e.to_string()),
            CoreError::Settings(e) => Self::BadRequest(e.to_string()),
            CoreError::Conflict(msg) => Self::Conflict(msg),
            CoreError::Configuration(msg) => Self::Internal(format!("Config: {msg}")),
            CoreError::ExternalService(msg) => Self::ServiceUnavailable(msg),
            CoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<ProcessError> for HttpError {
    fn from(err: ProcessError) -> Self {
        match err {
            e @ ProcessError::SpawnFailed { .. } => Self::ServiceUnavailable(e.to_string()),
            ProcessError::Io(msg) => Self::Internal(format!("Process I/O: {msg}")),
            ProcessError::StopFailed(msg) => Self::Internal(format!("Stop failed: {msg}")),
        }
    }
}
