use serde::Serialize;

use crate::{ChangeEvent, EventTransport, Result};

/// Serializes change events and hands them to a transport.
///
/// Every event is published with its item id as the partition key, whatever
/// the topic, so all changes for one product keep their relative order.
#[derive(Debug, Clone)]
pub struct EventPublisher<Tr: EventTransport> {
    transport: Tr,
}

impl<Tr: EventTransport> EventPublisher<Tr> {
    pub fn new(transport: Tr) -> Self {
        Self { transport }
    }

    /// Publishes one event and waits until the transport has accepted it.
    #[tracing::instrument(
        skip(self, event),
        fields(key = %event.key(), event_type = %event.event_type())
    )]
    pub async fn publish<T>(&self, topic: &str, event: &ChangeEvent<T>) -> Result<()>
    where
        T: Serialize + Clone + Send + Sync,
    {
        let payload = serde_json::to_vec(event)?;
        let partition_key = event.key().partition_key();

        tracing::debug!(bytes = payload.len(), "sending {} event", event.event_type());

        match self.transport.publish(topic, &partition_key, payload).await {
            Ok(()) => {
                metrics::counter!("events_published_total", "topic" => topic.to_string())
                    .increment(1);
                Ok(())
            }
            Err(e) => {
                metrics::counter!("event_publish_failures_total", "topic" => topic.to_string())
                    .increment(1);
                tracing::error!(error = %e, "event hand-off failed");
                Err(e)
            }
        }
    }
}
