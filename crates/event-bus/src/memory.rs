use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{EventTransport, Record, Result, TransportError};

/// Records of one partition not yet committed.
///
/// `base_offset` is the absolute offset of the first retained record.
#[derive(Debug, Clone, Default)]
struct PartitionLog {
    base_offset: u64,
    records: VecDeque<Record>,
}

impl PartitionLog {
    fn end_offset(&self) -> u64 {
        self.base_offset + self.records.len() as u64
    }

    fn commit(&mut self, offset: u64) -> usize {
        let offset = offset.min(self.end_offset());
        if offset <= self.base_offset {
            return 0;
        }
        let released = (offset - self.base_offset) as usize;
        self.records.drain(..released);
        self.base_offset = offset;
        released
    }
}

#[derive(Debug, Default)]
struct TopicLog {
    partitions: Vec<PartitionLog>,
}

#[derive(Debug, Default)]
struct TransportState {
    topics: HashMap<String, TopicLog>,
    next_sequence: u64,
    fail_on_publish: bool,
}

/// Partitioned in-memory transport.
///
/// Each topic is split into a fixed number of partitions; a record goes to
/// the partition chosen by hashing its key, so records with the same key
/// keep their publish order. Topics are created on first publish.
///
/// Records stay in memory until [`commit`](Self::commit) releases them;
/// offsets remain absolute across commits.
#[derive(Debug, Clone)]
pub struct InMemoryTransport {
    partitions: usize,
    state: Arc<RwLock<TransportState>>,
}

impl InMemoryTransport {
    /// Creates a transport with the given number of partitions per topic.
    pub fn new(partitions: usize) -> Self {
        Self {
            partitions: partitions.max(1),
            state: Arc::new(RwLock::new(TransportState::default())),
        }
    }

    pub fn partition_count(&self) -> usize {
        self.partitions
    }

    /// Returns the partition a key maps to.
    pub fn partition_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.partitions as u64) as usize
    }

    /// Makes every subsequent publish fail until reset.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().await.fail_on_publish = fail;
    }

    /// Reads the retained records of one partition from `from_offset` on.
    pub async fn read(&self, topic: &str, partition: usize, from_offset: u64) -> Vec<Record> {
        let state = self.state.read().await;
        state
            .topics
            .get(topic)
            .and_then(|log| log.partitions.get(partition))
            .map(|log| {
                let skip = from_offset.saturating_sub(log.base_offset) as usize;
                log.records.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }

    /// Releases every record of a partition below `offset`.
    ///
    /// Commits past the end stop at the end; stale commits are ignored.
    /// Returns the number of records released.
    pub async fn commit(&self, topic: &str, partition: usize, offset: u64) -> usize {
        let mut state = self.state.write().await;
        let released = state
            .topics
            .get_mut(topic)
            .and_then(|log| log.partitions.get_mut(partition))
            .map_or(0, |log| log.commit(offset));
        if released > 0 {
            tracing::trace!(topic, partition, offset, released, "records released");
        }
        released
    }

    /// Returns every retained record of a topic in publish order.
    pub async fn records(&self, topic: &str) -> Vec<Record> {
        let state = self.state.read().await;
        let mut records: Vec<Record> = state
            .topics
            .get(topic)
            .map(|log| {
                log.partitions
                    .iter()
                    .flat_map(|p| p.records.iter().cloned())
                    .collect()
            })
            .unwrap_or_default();
        records.sort_by_key(|r| r.sequence);
        records
    }

    /// Returns the number of records retained for a topic.
    pub async fn record_count(&self, topic: &str) -> usize {
        let state = self.state.read().await;
        state
            .topics
            .get(topic)
            .map(|log| log.partitions.iter().map(|p| p.records.len()).sum())
            .unwrap_or(0)
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new(1)
    }
}

#[async_trait]
impl EventTransport for InMemoryTransport {
    async fn publish(&self, topic: &str, partition_key: &str, payload: Vec<u8>) -> Result<()> {
        let partition = self.partition_for(partition_key);
        let mut state = self.state.write().await;

        if state.fail_on_publish {
            return Err(TransportError::Unavailable {
                topic: topic.to_string(),
                reason: "broker unreachable".to_string(),
            });
        }

        let sequence = state.next_sequence;
        state.next_sequence += 1;

        let partitions = self.partitions;
        let log = state
            .topics
            .entry(topic.to_string())
            .or_insert_with(|| TopicLog {
                partitions: vec![PartitionLog::default(); partitions],
            });
        let log = &mut log.partitions[partition];
        let offset = log.end_offset();
        log.records.push_back(Record {
            topic: topic.to_string(),
            partition,
            offset,
            sequence,
            key: partition_key.to_string(),
            payload,
            published_at: Utc::now(),
        });

        Ok(())
    }
}
