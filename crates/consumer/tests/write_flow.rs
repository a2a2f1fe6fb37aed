//! Composite writes flowing through the transport into downstream stores.

use common::ItemId;
use composite::WritePropagator;
use consumer::{
    EntityStore,
    MessageProcessor, PartitionConsumer, ProductStore, RecommendationStore, ReviewStore,
};
use domain::{CreateAggregateRequest, Product, Recommendation, RecommendationSummary, Review, ReviewSummary};
use event_bus::{EventType, InMemoryTransport, topic};

struct Downstream {
    products: PartitionConsumer<InMemoryTransport, Product, ProductStore>,
    recommendations: PartitionConsumer<InMemoryTransport, Recommendation, RecommendationStore>,
    reviews: PartitionConsumer<InMemoryTransport, Review, ReviewStore>,
}

impl Downstream {
    fn new(transport: &InMemoryTransport, partition: usize) -> Self {
        Self {
            products: PartitionConsumer::new(
                transport.clone(),
                partition,
                MessageProcessor::new(topic::PRODUCTS, ProductStore::new()),
            ),
            recommendations: PartitionConsumer::new(
                transport.clone(),
                partition,
                MessageProcessor::new(topic::RECOMMENDATIONS, RecommendationStore::new()),
            ),
            reviews: PartitionConsumer::new(
                transport.clone(),
                partition,
                MessageProcessor::new(topic::REVIEWS, ReviewStore::new()),
            ),
        }
    }

    async fn poll(&self) {
        for summary in [
            self.products.poll().await,
            self.recommendations.poll().await,
            self.reviews.poll().await,
        ] {
            assert_eq!(summary.failed, 0);
        }
    }
}

fn request(item_id: i64) -> CreateAggregateRequest {
    CreateAggregateRequest::new(item_id, "name", 1)
        .with_recommendations(vec![RecommendationSummary::new(1, "a", 1, "c")])
        .with_reviews(vec![ReviewSummary::new(1, "a", "s", "c")])
}

#[tokio::test]
async fn test_create_then_delete_leaves_stores_empty() {
    let transport = InMemoryTransport::new(1);
    let propagator = WritePropagator::new(transport.clone());
    let downstream = Downstream::new(&transport, 0);
    let key = ItemId::new(5).unwrap();

    propagator.propagate_create(request(5)).await.unwrap();
    propagator.propagate_delete(key).await.unwrap();

    for topic in topic::ALL {
        let types: Vec<EventType> = transport
            .read(topic, 0, 0)
            .await
            .iter()
            .map(|r| r.decode::<serde_json::Value>().unwrap().event_type())
            .collect();
        assert_eq!(types, vec![EventType::Create, EventType::Delete], "topic {topic}");
    }

    downstream.poll().await;
    assert!(downstream.products.processor().store().is_empty().await);
    assert!(downstream.recommendations.processor().store().is_empty().await);
    assert!(downstream.reviews.processor().store().is_empty().await);
    for topic in topic::ALL {
        assert_eq!(transport.record_count(topic).await, 0, "topic {topic}");
    }
}

#[tokio::test]
async fn test_created_entities_reach_their_stores() {
    let transport = InMemoryTransport::new(1);
    let propagator = WritePropagator::new(transport.clone());
    let downstream = Downstream::new(&transport, 0);
    let key = ItemId::new(8).unwrap();

    propagator.propagate_create(request(8)).await.unwrap();
    downstream.poll().await;

    let products = downstream.products.processor().store().find(key).await;
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "name");
    assert_eq!(downstream.recommendations.processor().store().find(key).await.len(), 1);
    assert_eq!(downstream.reviews.processor().store().find(key).await.len(), 1);
}

#[tokio::test]
async fn test_repeated_delete_is_harmless() {
    let transport = InMemoryTransport::new(1);
    let propagator = WritePropagator::new(transport.clone());
    let downstream = Downstream::new(&transport, 0);
    let key = ItemId::new(3).unwrap();

    propagator.propagate_delete(key).await.unwrap();
    propagator.propagate_delete(key).await.unwrap();

    for topic in topic::ALL {
        assert_eq!(transport.record_count(topic).await, 2);
    }
    downstream.poll().await;
    assert_eq!(downstream.products.position().await.offset, 2);
}

#[tokio::test]
async fn test_redelivered_events_do_not_duplicate_entities() {
    let transport = InMemoryTransport::new(1);
    let propagator = WritePropagator::new(transport.clone());
    let key = ItemId::new(4).unwrap();
    propagator.propagate_create(request(4)).await.unwrap();
    let delivered = transport.read(topic::RECOMMENDATIONS, 0, 0).await;

    let store = RecommendationStore::new();
    let consumer = PartitionConsumer::new(
        transport.clone(),
        0,
        MessageProcessor::new(topic::RECOMMENDATIONS, store.clone()),
    );
    assert_eq!(consumer.poll().await.applied, 1);
    for record in &delivered {
        consumer.processor().process(record).await.unwrap();
    }

    assert_eq!(store.find(key).await.len(), 1);
}
