//! Event processing error types.

use thiserror::Error;

/// Errors raised while applying a change event.
///
/// Fatal for the event that raised it: the partition consumer logs it and
/// moves on to the next record.
#[derive(Debug, Error)]
pub enum EventProcessingError {
    /// The record is not a valid change event for this topic.
    #[error("Malformed event: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A CREATE whose entity belongs to a different item than the event key.
    #[error("Event key {key} does not match entity parent {parent}")]
    KeyMismatch { key: i64, parent: i64 },

    /// The store rejected the change.
    #[error("Store error: {0}")]
    Store(String),
}

/// Result type for event processing.
pub type Result<T> = std::result::Result<T, EventProcessingError>;
