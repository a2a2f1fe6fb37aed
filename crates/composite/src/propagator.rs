//! Write-side propagation of composite changes as per-domain events.

use common::ItemId;
use domain::CreateAggregateRequest;
use event_bus::{topic, ChangeEvent, EventPublisher, EventTransport};
use serde::Serialize;

use crate::error::Result;

/// Turns composite writes into change events on the three domain topics.
///
/// Every event is keyed by the item id, so all changes to one product share
/// a partition on every topic. Events for one topic are handed off one after
/// another in request order; the three topics proceed concurrently. A call
/// returns once every hand-off has been accepted, with no wait for
/// downstream processing.
#[derive(Debug, Clone)]
pub struct WritePropagator<Tr: EventTransport> {
    publisher: EventPublisher<Tr>,
}

impl<Tr: EventTransport> WritePropagator<Tr> {
    pub fn new(transport: Tr) -> Self {
        Self {
            publisher: EventPublisher::new(transport),
        }
    }

    /// Emits one product CREATE, then one CREATE per supplied recommendation
    /// and review.
    ///
    /// Invalid requests fail with `InvalidInput` before anything is emitted.
    /// A transport failure fails the call with `Unexpected`; events already
    /// accepted are not withdrawn.
    #[tracing::instrument(skip(self, request), fields(item_id = request.item_id))]
    pub async fn propagate_create(&self, request: CreateAggregateRequest) -> Result<()> {
        let write = request.into_write()?;
        let key = write.item_id();

        tracing::debug!(
            recommendations = write.recommendations.len(),
            reviews = write.reviews.len(),
            "creating a new composite entity"
        );

        let products = [ChangeEvent::create(key, write.product)];
        let recommendations: Vec<_> = write
            .recommendations
            .into_iter()
            .map(|r| ChangeEvent::create(key, r))
            .collect();
        let reviews: Vec<_> = write
            .reviews
            .into_iter()
            .map(|r| ChangeEvent::create(key, r))
            .collect();

        let (p, r, v) = tokio::join!(
            self.publish_in_order(topic::PRODUCTS, &products),
            self.publish_in_order(topic::RECOMMENDATIONS, &recommendations),
            self.publish_in_order(topic::REVIEWS, &reviews),
        );
        p.and(r).and(v)?;

        tracing::info!("composite entity created");
        Ok(())
    }

    /// Emits a DELETE for the item on each of the three topics.
    ///
    /// Deleting an unknown item is not an error; downstream deletes are
    /// idempotent.
    #[tracing::instrument(skip(self), fields(item_id = %item_id))]
    pub async fn propagate_delete(&self, item_id: ItemId) -> Result<()> {
        tracing::debug!("deleting a composite entity");

        let (p, r, v) = tokio::join!(
            self.publish_delete(topic::PRODUCTS, item_id),
            self.publish_delete(topic::RECOMMENDATIONS, item_id),
            self.publish_delete(topic::REVIEWS, item_id),
        );
        p.and(r).and(v)?;

        tracing::info!("composite entity deleted");
        Ok(())
    }

    async fn publish_delete(&self, topic: &str, item_id: ItemId) -> Result<()> {
        // The entity type only matters for decoding; a delete carries none.
        let event = ChangeEvent::<()>::delete(item_id);
        self.publisher.publish(topic, &event).await?;
        Ok(())
    }

    async fn publish_in_order<T>(&self, topic: &str, events: &[ChangeEvent<T>]) -> Result<()>
    where
        T: Serialize + Clone + Send + Sync,
    {
        for event in events {
            self.publisher.publish(topic, event).await?;
        }
        Ok(())
    }
}
