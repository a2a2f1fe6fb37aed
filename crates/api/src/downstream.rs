//! In-process downstream consumers for the in-memory transport.
//!
//! When the server runs with [`InMemoryTransport`] there is no broker for
//! the domain services to read from, so the binary drains every topic
//! partition into local stores itself.

use std::time::Duration;

use consumer::{
    Entity, EntityStore, MessageProcessor, PartitionConsumer, ProductStore, RecommendationStore,
    ReviewStore,
};
use event_bus::{InMemoryTransport, topic};
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

/// Stores fed by the local consumers.
#[derive(Debug, Clone, Default)]
pub struct LocalStores {
    pub products: ProductStore,
    pub recommendations: RecommendationStore,
    pub reviews: ReviewStore,
}

/// Starts one polling task per topic partition.
///
/// The tasks run until aborted. A record that fails to apply is logged and
/// skipped, and handled records are released from the transport.
pub fn spawn(
    transport: &InMemoryTransport,
    stores: &LocalStores,
    interval: Duration,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::new();
    for partition in 0..transport.partition_count() {
        handles.push(spawn_one(
            transport,
            partition,
            MessageProcessor::new(topic::PRODUCTS, stores.products.clone()),
            interval,
        ));
        handles.push(spawn_one(
            transport,
            partition,
            MessageProcessor::new(topic::RECOMMENDATIONS, stores.recommendations.clone()),
            interval,
        ));
        handles.push(spawn_one(
            transport,
            partition,
            MessageProcessor::new(topic::REVIEWS, stores.reviews.clone()),
            interval,
        ));
    }
    tracing::info!(tasks = handles.len(), "local consumers started");
    handles
}

fn spawn_one<T, S>(
    transport: &InMemoryTransport,
    partition: usize,
    processor: MessageProcessor<T, S>,
    interval: Duration,
) -> JoinHandle<()>
where
    T: Entity + DeserializeOwned,
    S: EntityStore<T> + 'static,
{
    let consumer = PartitionConsumer::new(transport.clone(), partition, processor);
    tokio::spawn(async move {
        loop {
            consumer.poll().await;
            tokio::time::sleep(interval).await;
        }
    })
}
