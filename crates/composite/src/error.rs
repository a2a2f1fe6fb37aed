//! Composite error types.

use domain::DomainError;
use event_bus::TransportError;
use thiserror::Error;

/// Classified failure of a composite read or write.
///
/// The message is the original upstream message wherever one exists, so it
/// can be shown to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeError {
    /// The requested entity does not exist upstream.
    #[error("{0}")]
    NotFound(String),

    /// The caller sent something the upstream rejected (bad id, duplicate key).
    #[error("{0}")]
    InvalidInput(String),

    /// Transport faults, timeouts and any other upstream failure.
    #[error("{0}")]
    Unexpected(String),
}

impl CompositeError {
    pub fn message(&self) -> &str {
        match self {
            CompositeError::NotFound(msg)
            | CompositeError::InvalidInput(msg)
            | CompositeError::Unexpected(msg) => msg,
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CompositeError::NotFound(_) => "not_found",
            CompositeError::InvalidInput(_) => "invalid_input",
            CompositeError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<DomainError> for CompositeError {
    fn from(err: DomainError) -> Self {
        CompositeError::InvalidInput(err.to_string())
    }
}

impl From<common::InvalidItemId> for CompositeError {
    fn from(err: common::InvalidItemId) -> Self {
        CompositeError::InvalidInput(err.to_string())
    }
}

impl From<TransportError> for CompositeError {
    fn from(err: TransportError) -> Self {
        CompositeError::Unexpected(err.to_string())
    }
}

/// Convenience type alias for composite results.
pub type Result<T> = std::result::Result<T, CompositeError>;
