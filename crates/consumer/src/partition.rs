//! Single-partition consumption with a tracked position.

use std::fmt;

use async_trait::async_trait;
use event_bus::{InMemoryTransport, Record};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::processor::MessageProcessor;
use crate::store::{Entity, EntityStore};

/// Offset of the next record a consumer will read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerPosition {
    pub offset: u64,
}

impl ConsumerPosition {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn advance(&self) -> Self {
        Self {
            offset: self.offset + 1,
        }
    }
}

impl fmt::Display for ConsumerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset({})", self.offset)
    }
}

/// Something a consumer can read partitioned records from.
#[async_trait]
pub trait PartitionSource: Send + Sync {
    async fn read(&self, topic: &str, partition: usize, from_offset: u64) -> Vec<Record>;

    /// Tells the source every record below `offset` is done with.
    async fn commit(&self, topic: &str, partition: usize, offset: u64);
}

#[async_trait]
impl PartitionSource for InMemoryTransport {
    async fn read(&self, topic: &str, partition: usize, from_offset: u64) -> Vec<Record> {
        InMemoryTransport::read(self, topic, partition, from_offset).await
    }

    async fn commit(&self, topic: &str, partition: usize, offset: u64) {
        InMemoryTransport::commit(self, topic, partition, offset).await;
    }
}

/// Outcome of one [`PartitionConsumer::poll`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub applied: usize,
    pub failed: usize,
}

/// Feeds one partition of one topic to a [`MessageProcessor`].
///
/// Records are applied strictly in offset order. A record that fails to
/// apply is logged, counted and skipped; it is never retried. The position
/// is committed back to the source after every poll that moved it.
pub struct PartitionConsumer<Src, T, S>
where
    Src: PartitionSource,
    T: Entity + DeserializeOwned,
    S: EntityStore<T>,
{
    source: Src,
    partition: usize,
    processor: MessageProcessor<T, S>,
    position: Mutex<ConsumerPosition>,
}

impl<Src, T, S> PartitionConsumer<Src, T, S>
where
    Src: PartitionSource,
    T: Entity + DeserializeOwned,
    S: EntityStore<T>,
{
    pub fn new(source: Src, partition: usize, processor: MessageProcessor<T, S>) -> Self {
        Self {
            source,
            partition,
            processor,
            position: Mutex::new(ConsumerPosition::zero()),
        }
    }

    /// Resumes from a previously committed position.
    pub fn starting_at(mut self, position: ConsumerPosition) -> Self {
        self.position = Mutex::new(position);
        self
    }

    pub fn processor(&self) -> &MessageProcessor<T, S> {
        &self.processor
    }

    pub async fn position(&self) -> ConsumerPosition {
        *self.position.lock().await
    }

    /// Handles every record available past the current position.
    #[tracing::instrument(skip(self), fields(topic = self.processor.topic(), partition = self.partition))]
    pub async fn poll(&self) -> PollSummary {
        let topic = self.processor.topic();
        let mut position = self.position.lock().await;
        let records = self.source.read(topic, self.partition, position.offset).await;

        let mut summary = PollSummary::default();
        for record in &records {
            match self.processor.process(record).await {
                Ok(()) => summary.applied += 1,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        key = %record.key,
                        offset = record.offset,
                        "event processing failed, skipping record"
                    );
                    metrics::counter!("consumer_events_failed_total", "topic" => topic)
                        .increment(1);
                    summary.failed += 1;
                }
            }
            *position = ConsumerPosition {
                offset: record.offset,
            }
            .advance();
        }

        if !records.is_empty() {
            self.source
                .commit(topic, self.partition, position.offset)
                .await;
            tracing::debug!(
                applied = summary.applied,
                failed = summary.failed,
                offset = position.offset,
                "partition caught up"
            );
        }
        summary
    }
}
