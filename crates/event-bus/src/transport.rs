use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::{ChangeEvent, Result};

/// A record as stored by a transport partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub topic: String,
    pub partition: usize,
    /// Position within the partition, starting at 0.
    pub offset: u64,
    /// Publish order across the whole transport.
    pub sequence: u64,
    pub key: String,
    pub payload: Vec<u8>,
    pub published_at: DateTime<Utc>,
}

impl Record {
    /// Decodes the payload as a change event.
    pub fn decode<T: DeserializeOwned>(&self) -> std::result::Result<ChangeEvent<T>, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

/// Seam to the asynchronous message transport.
///
/// Delivery is at-least-once. Records sharing a partition key land in the
/// same partition and are delivered in publish order; no other ordering is
/// promised. A successful return means the transport accepted the record,
/// not that any consumer has processed it.
#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn publish(&self, topic: &str, partition_key: &str, payload: Vec<u8>) -> Result<()>;
}

#[async_trait]
impl<T: EventTransport + ?Sized> EventTransport for std::sync::Arc<T> {
    async fn publish(&self, topic: &str, partition_key: &str, payload: Vec<u8>) -> Result<()> {
        (**self).publish(topic, partition_key, payload).await
    }
}
