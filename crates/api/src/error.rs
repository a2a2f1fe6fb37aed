//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use composite::CompositeError;
use serde::Serialize;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be parsed.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// The request parsed but carries invalid values.
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attaches the request path the error body reports.
    pub fn at(self, path: impl Into<String>) -> ErrorResponse {
        ErrorResponse {
            error: self,
            path: path.into(),
        }
    }
}

impl From<CompositeError> for ApiError {
    fn from(err: CompositeError) -> Self {
        match err {
            CompositeError::NotFound(msg) => ApiError::NotFound(msg),
            CompositeError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            CompositeError::Unexpected(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<common::InvalidItemId> for ApiError {
    fn from(err: common::InvalidItemId) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct HttpErrorBody {
    pub timestamp: String,
    pub path: String,
    pub status: u16,
    pub error: &'static str,
    pub message: String,
}

/// An [`ApiError`] bound to the path of the request that caused it.
#[derive(Debug)]
pub struct ErrorResponse {
    error: ApiError,
    path: String,
}

impl ErrorResponse {
    pub fn error(&self) -> &ApiError {
        &self.error
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            tracing::error!(path = %self.path, error = %self.error, "internal server error");
        } else {
            tracing::debug!(path = %self.path, %status, error = %self.error, "request rejected");
        }

        let body = HttpErrorBody {
            timestamp: Utc::now().to_rfc3339(),
            path: self.path,
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown"),
            message: self.error.to_string(),
        };
        (status, axum::Json(body)).into_response()
    }
}
