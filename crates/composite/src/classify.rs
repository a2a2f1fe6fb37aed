//! Maps failed upstream calls to [`CompositeError`] kinds.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::CompositeError;

/// Structured error body returned by every service in the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpErrorInfo {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl HttpErrorInfo {
    /// Extracts the message from a raw body, if it is a structured error.
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<HttpErrorInfo>(body)
            .ok()
            .and_then(|info| info.message)
    }
}

/// Classifies a non-success HTTP response.
///
/// 404 and 422 become `NotFound` and `InvalidInput` carrying the upstream's
/// own message; anything else is `Unexpected` and is logged with the full
/// status and body. `fallback` is used when the body carries no message.
pub fn classify_response(
    domain: &str,
    status: StatusCode,
    body: &str,
    fallback: &str,
) -> CompositeError {
    let message = HttpErrorInfo::message_from(body).unwrap_or_else(|| fallback.to_string());

    match status {
        StatusCode::NOT_FOUND => CompositeError::NotFound(message),
        StatusCode::UNPROCESSABLE_ENTITY => CompositeError::InvalidInput(message),
        _ => {
            tracing::warn!(domain, %status, "got an unexpected HTTP error, will rethrow it");
            tracing::warn!(domain, body, "error body");
            CompositeError::Unexpected(message)
        }
    }
}

/// Classifies a failure that produced no usable response (connect, timeout, decode).
pub fn classify_transport(domain: &str, err: &reqwest::Error) -> CompositeError {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connect"
    } else if err.is_decode() {
        "decode"
    } else {
        "transport"
    };
    tracing::warn!(domain, kind, error = %err, "got an unexpected error, will rethrow it");
    CompositeError::Unexpected(err.to_string())
}
