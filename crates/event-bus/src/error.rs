use thiserror::Error;

/// Errors that can occur when handing events to the transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport refused or could not accept the record.
    #[error("Event transport unavailable for topic '{topic}': {reason}")]
    Unavailable { topic: String, reason: String },

    /// The event could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
