//! Read-side fan-out over the three upstream services.

use common::ItemId;
use domain::{Product, ProductAggregate, Recommendation, Review, ServiceAddresses};

use crate::config::UpstreamConfig;
use crate::error::Result;
use crate::pool::WorkerPool;
use crate::services::domain_label::{RECOMMENDATION, REVIEW};
use crate::services::{
    HttpProductService, HttpRecommendationService, HttpReviewService, ProductService,
    RecommendationService, ReviewService,
};

/// Builds [`ProductAggregate`]s by querying all three upstreams at once.
///
/// The product call is mandatory: its failure fails the read with the
/// classified error unchanged. A failed recommendation or review call is
/// logged and replaced by an empty list.
pub struct AggregationOrchestrator<P, R, V>
where
    P: ProductService,
    R: RecommendationService,
    V: ReviewService,
{
    products: P,
    recommendations: R,
    reviews: V,
    pool: WorkerPool,
    service_address: String,
}

impl<P, R, V> AggregationOrchestrator<P, R, V>
where
    P: ProductService,
    R: RecommendationService,
    V: ReviewService,
{
    /// Creates an orchestrator; `service_address` identifies this instance
    /// in every aggregate it returns.
    pub fn new(
        products: P,
        recommendations: R,
        reviews: V,
        pool: WorkerPool,
        service_address: impl Into<String>,
    ) -> Self {
        Self {
            products,
            recommendations,
            reviews,
            pool,
            service_address: service_address.into(),
        }
    }

    /// Reads one aggregate.
    ///
    /// The three upstream calls are issued together, so the read takes about
    /// as long as the slowest of them.
    #[tracing::instrument(skip(self), fields(item_id = %item_id))]
    pub async fn get_aggregate(&self, item_id: ItemId) -> Result<ProductAggregate> {
        metrics::counter!("composite_reads_total").increment(1);
        let start = std::time::Instant::now();

        let (product, recommendations, reviews) = tokio::join!(
            self.pool.run(self.products.get_product(item_id)),
            self.pool
                .run(self.recommendations.get_recommendations(item_id)),
            self.pool.run(self.reviews.get_reviews(item_id)),
        );

        let product = product.inspect_err(|e| {
            tracing::debug!(kind = e.kind(), error = %e, "product lookup failed");
        })?;
        let recommendations = or_empty(RECOMMENDATION, recommendations);
        let reviews = or_empty(REVIEW, reviews);

        let aggregate = merge(&self.service_address, product, recommendations, reviews);

        metrics::histogram!("composite_read_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        tracing::debug!(
            recommendations = aggregate.recommendations.len(),
            reviews = aggregate.reviews.len(),
            "aggregate assembled"
        );
        Ok(aggregate)
    }
}

impl AggregationOrchestrator<HttpProductService, HttpRecommendationService, HttpReviewService> {
    /// Wires HTTP clients for all three upstreams from `config`.
    pub fn connect(config: &UpstreamConfig, service_address: impl Into<String>) -> Result<Self> {
        Ok(Self::new(
            HttpProductService::new(config.product.clone())?,
            HttpRecommendationService::new(config.recommendation.clone())?,
            HttpReviewService::new(config.review.clone())?,
            WorkerPool::new(config.pool_size, config.queue_depth),
            service_address,
        ))
    }
}

fn or_empty<T>(domain: &'static str, result: Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            metrics::counter!("composite_degraded_reads_total", "domain" => domain).increment(1);
            tracing::warn!(
                domain,
                kind = e.kind(),
                error = %e,
                "optional upstream failed, returning an empty list"
            );
            Vec::new()
        }
    }
}

/// Merges upstream results into one aggregate.
///
/// List order is preserved. Each upstream address is taken from the product
/// or from the first element of its list, and is empty for an empty list.
pub fn merge(
    composite_address: &str,
    product: Product,
    recommendations: Vec<Recommendation>,
    reviews: Vec<Review>,
) -> ProductAggregate {
    let service_addresses = ServiceAddresses {
        composite: composite_address.to_string(),
        product: product.service_address.clone().unwrap_or_default(),
        recommendation: recommendations
            .first()
            .and_then(|r| r.service_address.clone())
            .unwrap_or_default(),
        review: reviews
            .first()
            .and_then(|r| r.service_address.clone())
            .unwrap_or_default(),
    };

    ProductAggregate {
        item_id: product.item_id,
        name: product.name,
        weight: product.weight,
        recommendations: recommendations.iter().map(Recommendation::summary).collect(),
        reviews: reviews.iter().map(Review::summary).collect(),
        service_addresses,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use domain::{RecommendationSummary, ReviewSummary};

    use super::*;
    use crate::error::CompositeError;
    use crate::services::{
        InMemoryProductService, InMemoryRecommendationService, InMemoryReviewService,
    };

    type Orchestrator = AggregationOrchestrator<
        InMemoryProductService,
        InMemoryRecommendationService,
        InMemoryReviewService,
    >;

    struct Fixture {
        products: InMemoryProductService,
        recommendations: InMemoryRecommendationService,
        reviews: InMemoryReviewService,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                products: InMemoryProductService::new(),
                recommendations: InMemoryRecommendationService::new(),
                reviews: InMemoryReviewService::new(),
            }
        }

        fn orchestrator(&self, pool: WorkerPool) -> Orchestrator {
            AggregationOrchestrator::new(
                self.products.clone(),
                self.recommendations.clone(),
                self.reviews.clone(),
                pool,
                "composite:7000",
            )
        }

        async fn seed(&self, item_id: ItemId) {
            self.products
                .insert(Product::new(item_id, "name", 100).with_service_address("product:8080"))
                .await;
            let mut rec = RecommendationSummary::new(1, "author 1", 1, "content 1")
                .to_recommendation(item_id);
            rec.service_address = Some("recommendation:8080".to_string());
            self.recommendations.insert(rec).await;
            let mut review = ReviewSummary::new(1, "author 1", "subject 1", "content 1")
                .to_review(item_id);
            review.service_address = Some("review:8080".to_string());
            self.reviews.insert(review).await;
        }
    }

    fn id(value: i64) -> ItemId {
        ItemId::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_all_upstreams_healthy() {
        let fixture = Fixture::new();
        fixture.seed(id(1)).await;

        let aggregate = fixture
            .orchestrator(WorkerPool::default())
            .get_aggregate(id(1))
            .await
            .unwrap();

        assert_eq!(aggregate.item_id, id(1));
        assert_eq!(aggregate.name, "name");
        assert_eq!(aggregate.weight, 100);
        assert_eq!(aggregate.recommendations.len(), 1);
        assert_eq!(aggregate.reviews.len(), 1);
        assert_eq!(aggregate.service_addresses.composite, "composite:7000");
        assert_eq!(aggregate.service_addresses.product, "product:8080");
        assert_eq!(aggregate.service_addresses.recommendation, "recommendation:8080");
        assert_eq!(aggregate.service_addresses.review, "review:8080");
    }

    #[tokio::test]
    async fn test_missing_product_propagates_not_found() {
        let fixture = Fixture::new();
        let err = fixture
            .orchestrator(WorkerPool::default())
            .get_aggregate(id(13))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CompositeError::NotFound("No product found for itemId: 13".to_string())
        );
    }

    #[tokio::test]
    async fn test_missing_product_is_not_found_even_with_failing_secondaries() {
        let fixture = Fixture::new();
        fixture
            .recommendations
            .set_failure(Some(CompositeError::Unexpected("connection refused".to_string())))
            .await;
        fixture
            .reviews
            .set_failure(Some(CompositeError::Unexpected("timed out".to_string())))
            .await;

        let err = fixture
            .orchestrator(WorkerPool::default())
            .get_aggregate(id(21))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CompositeError::NotFound("No product found for itemId: 21".to_string())
        );
    }

    #[tokio::test]
    async fn test_product_failure_wins_over_healthy_secondaries() {
        let fixture = Fixture::new();
        fixture.seed(id(1)).await;
        fixture
            .products
            .set_failure(Some(CompositeError::InvalidInput("Invalid itemId: 1".to_string())))
            .await;

        let err = fixture
            .orchestrator(WorkerPool::default())
            .get_aggregate(id(1))
            .await
            .unwrap_err();
        assert_eq!(err, CompositeError::InvalidInput("Invalid itemId: 1".to_string()));
    }

    #[tokio::test]
    async fn test_failed_secondaries_degrade_to_empty_lists() {
        let fixture = Fixture::new();
        fixture.seed(id(1)).await;
        fixture
            .recommendations
            .set_failure(Some(CompositeError::Unexpected("timed out".to_string())))
            .await;
        fixture
            .reviews
            .set_failure(Some(CompositeError::NotFound("gone".to_string())))
            .await;

        let aggregate = fixture
            .orchestrator(WorkerPool::default())
            .get_aggregate(id(1))
            .await
            .unwrap();

        assert_eq!(aggregate.name, "name");
        assert!(aggregate.recommendations.is_empty());
        assert!(aggregate.reviews.is_empty());
        assert_eq!(aggregate.service_addresses.recommendation, "");
        assert_eq!(aggregate.service_addresses.review, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_upstream_calls_run_concurrently() {
        let fixture = Fixture::new();
        fixture.seed(id(1)).await;
        let delay = Some(Duration::from_millis(300));
        fixture.products.set_delay(delay).await;
        fixture.recommendations.set_delay(delay).await;
        fixture.reviews.set_delay(delay).await;

        let start = tokio::time::Instant::now();
        fixture
            .orchestrator(WorkerPool::default())
            .get_aggregate(id(1))
            .await
            .unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(600), "took {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_saturated_pool_degrades_secondaries_only() {
        let fixture = Fixture::new();
        fixture.seed(id(1)).await;
        fixture
            .products
            .set_delay(Some(Duration::from_millis(50)))
            .await;

        let aggregate = fixture
            .orchestrator(WorkerPool::new(1, 0))
            .get_aggregate(id(1))
            .await
            .unwrap();

        assert_eq!(aggregate.name, "name");
        assert!(aggregate.recommendations.is_empty());
        assert!(aggregate.reviews.is_empty());
    }

    #[test]
    fn test_merge_preserves_upstream_order() {
        let parent = id(4);
        let recommendations = [3, 1, 2]
            .into_iter()
            .map(|rid| RecommendationSummary::new(rid, "a", 2, "c").to_recommendation(parent))
            .collect();
        let reviews = [9, 8]
            .into_iter()
            .map(|rid| ReviewSummary::new(rid, "a", "s", "c").to_review(parent))
            .collect();

        let aggregate = merge("me", Product::new(parent, "n", 1), recommendations, reviews);

        let rec_ids: Vec<i64> = aggregate
            .recommendations
            .iter()
            .map(|r| r.recommendation_id)
            .collect();
        let review_ids: Vec<i64> = aggregate.reviews.iter().map(|r| r.review_id).collect();
        assert_eq!(rec_ids, vec![3, 1, 2]);
        assert_eq!(review_ids, vec![9, 8]);
        assert_eq!(aggregate.service_addresses.product, "");
    }
}
