//! Applies change events to an entity store.

use std::marker::PhantomData;

use event_bus::{ChangeEvent, EventAction, Record};
use serde::de::DeserializeOwned;

use crate::error::EventProcessingError;
use crate::store::{Entity, EntityStore};
use crate::Result;

/// Decodes records of one topic and applies them to a store.
///
/// CREATE upserts the carried entity; DELETE removes everything stored under
/// the event key. Records that do not decode as a change event of `T` are
/// rejected with [`EventProcessingError::Malformed`].
pub struct MessageProcessor<T, S>
where
    T: Entity + DeserializeOwned,
    S: EntityStore<T>,
{
    topic: &'static str,
    store: S,
    _entity: PhantomData<fn() -> T>,
}

impl<T, S> MessageProcessor<T, S>
where
    T: Entity + DeserializeOwned,
    S: EntityStore<T>,
{
    pub fn new(topic: &'static str, store: S) -> Self {
        Self {
            topic,
            store,
            _entity: PhantomData,
        }
    }

    pub fn topic(&self) -> &'static str {
        self.topic
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Decodes and applies one record.
    #[tracing::instrument(skip(self, record), fields(topic = self.topic, offset = record.offset))]
    pub async fn process(&self, record: &Record) -> Result<()> {
        let event: ChangeEvent<T> = record.decode().inspect_err(|e| {
            tracing::warn!(error = %e, key = %record.key, "rejecting malformed event");
        })?;
        self.apply(event).await?;

        metrics::counter!("consumer_events_processed_total", "topic" => self.topic).increment(1);
        Ok(())
    }

    /// Applies an already decoded event.
    pub async fn apply(&self, event: ChangeEvent<T>) -> Result<()> {
        let key = event.key();
        tracing::debug!(%key, event_type = %event.event_type(), "process message");

        match event.into_action() {
            EventAction::Create(entity) => {
                if entity.item_id() != key {
                    return Err(EventProcessingError::KeyMismatch {
                        key: key.as_i64(),
                        parent: entity.item_id().as_i64(),
                    });
                }
                self.store.upsert(entity).await?;
                tracing::info!(%key, "entity created");
            }
            EventAction::Delete => {
                let removed = self.store.delete_all(key).await?;
                tracing::info!(%key, removed, "entities deleted");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use common::ItemId;
    use domain::{Product, Review, ReviewSummary};
    use event_bus::{topic, EventTransport, InMemoryTransport};

    use super::*;
    use crate::store::{ProductStore, ReviewStore};

    /// Publishes `payload` on a throwaway transport and returns the record.
    async fn record(topic: &str, key: &str, payload: Vec<u8>) -> Record {
        let transport = InMemoryTransport::new(1);
        transport.publish(topic, key, payload).await.unwrap();
        transport.records(topic).await.remove(0)
    }

    fn id(value: i64) -> ItemId {
        ItemId::new(value).unwrap()
    }

    async fn encoded<T: serde::Serialize + Clone>(topic: &str, event: ChangeEvent<T>) -> Record {
        let payload = serde_json::to_vec(&event).unwrap();
        record(topic, &event.key().to_string(), payload).await
    }

    #[tokio::test]
    async fn test_create_then_delete() {
        let processor = MessageProcessor::new(topic::PRODUCTS, ProductStore::new());

        let create = encoded(
            topic::PRODUCTS,
            ChangeEvent::create(id(1), Product::new(id(1), "name", 1)),
        )
        .await;
        processor.process(&create).await.unwrap();
        assert_eq!(processor.store().find(id(1)).await.len(), 1);

        let delete = encoded(topic::PRODUCTS, ChangeEvent::<Product>::delete(id(1))).await;
        processor.process(&delete).await.unwrap();
        assert!(processor.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_replayed_create_is_idempotent() {
        let processor = MessageProcessor::new(topic::REVIEWS, ReviewStore::new());
        let review: Review = ReviewSummary::new(1, "a", "s", "c").to_review(id(2));
        let record = encoded(topic::REVIEWS, ChangeEvent::create(id(2), review)).await;

        processor.process(&record).await.unwrap();
        processor.process(&record).await.unwrap();

        assert_eq!(processor.store().len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_of_missing_key_succeeds() {
        let processor = MessageProcessor::new(topic::REVIEWS, ReviewStore::new());
        let record = encoded(topic::REVIEWS, ChangeEvent::<Review>::delete(id(9))).await;
        processor.process(&record).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_event_type_is_malformed() {
        let processor = MessageProcessor::new(topic::PRODUCTS, ProductStore::new());
        let payload = br#"{"eventType":"UPDATE","key":1,"data":null,"eventCreatedAt":"2024-01-01T00:00:00Z"}"#;
        let record = record(topic::PRODUCTS, "1", payload.to_vec()).await;

        let err = processor.process(&record).await.unwrap_err();
        assert!(matches!(err, EventProcessingError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_create_without_data_is_malformed() {
        let processor = MessageProcessor::new(topic::PRODUCTS, ProductStore::new());
        let payload = br#"{"eventType":"CREATE","key":1,"eventCreatedAt":"2024-01-01T00:00:00Z"}"#;
        let record = record(topic::PRODUCTS, "1", payload.to_vec()).await;

        let err = processor.process(&record).await.unwrap_err();
        assert!(matches!(err, EventProcessingError::Malformed(_)));
        assert!(processor.store().is_empty().await);
    }

    /// Store that rejects every write.
    struct UnavailableStore;

    #[async_trait::async_trait]
    impl EntityStore<Product> for UnavailableStore {
        async fn upsert(&self, _entity: Product) -> Result<()> {
            Err(EventProcessingError::Store("store offline".to_string()))
        }

        async fn delete_all(&self, _item_id: ItemId) -> Result<usize> {
            Err(EventProcessingError::Store("store offline".to_string()))
        }

        async fn find(&self, _item_id: ItemId) -> Vec<Product> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_store_error() {
        let processor = MessageProcessor::new(topic::PRODUCTS, UnavailableStore);
        let record = encoded(
            topic::PRODUCTS,
            ChangeEvent::create(id(1), Product::new(id(1), "name", 1)),
        )
        .await;

        let err = processor.process(&record).await.unwrap_err();
        assert_eq!(err.to_string(), "Store error: store offline");
    }

    #[tokio::test]
    async fn test_entity_for_another_item_is_rejected() {
        let processor = MessageProcessor::new(topic::PRODUCTS, ProductStore::new());
        let event = ChangeEvent::create(id(1), Product::new(id(2), "name", 1));

        let err = processor.apply(event).await.unwrap_err();
        assert!(matches!(
            err,
            EventProcessingError::KeyMismatch { key: 1, parent: 2 }
        ));
    }
}
