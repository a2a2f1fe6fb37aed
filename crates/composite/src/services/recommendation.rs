//! Recommendation service trait, HTTP client and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::ItemId;
use domain::Recommendation;
use tokio::sync::RwLock;

use super::domain_label::RECOMMENDATION;
use super::http::HttpUpstream;
use crate::config::ServiceEndpoint;
use crate::error::{CompositeError, Result};

/// Read access to the recommendation service.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Lists the recommendations of a product; empty when it has none.
    async fn get_recommendations(&self, item_id: ItemId) -> Result<Vec<Recommendation>>;
}

/// Recommendation service reached over HTTP at
/// `GET /recommendation?productId={itemId}`.
#[derive(Debug, Clone)]
pub struct HttpRecommendationService {
    upstream: HttpUpstream,
}

impl HttpRecommendationService {
    pub fn new(endpoint: ServiceEndpoint) -> Result<Self> {
        Ok(Self {
            upstream: HttpUpstream::new(RECOMMENDATION, endpoint)?,
        })
    }
}

#[async_trait]
impl RecommendationService for HttpRecommendationService {
    async fn get_recommendations(&self, item_id: ItemId) -> Result<Vec<Recommendation>> {
        let recommendations: Vec<Recommendation> = self
            .upstream
            .get_json(&format!("/recommendation?productId={item_id}"))
            .await?;
        tracing::debug!(%item_id, count = recommendations.len(), "found recommendations");
        Ok(recommendations)
    }
}

#[derive(Debug, Default)]
struct InMemoryRecommendationState {
    by_product: HashMap<ItemId, Vec<Recommendation>>,
    failure: Option<CompositeError>,
    delay: Option<Duration>,
}

/// In-memory recommendation service for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecommendationService {
    state: Arc<RwLock<InMemoryRecommendationState>>,
}

impl InMemoryRecommendationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a recommendation to its parent product's list.
    pub async fn insert(&self, recommendation: Recommendation) {
        self.state
            .write()
            .await
            .by_product
            .entry(recommendation.parent_item_id)
            .or_default()
            .push(recommendation);
    }

    pub async fn set_failure(&self, failure: Option<CompositeError>) {
        self.state.write().await.failure = failure;
    }

    pub async fn set_delay(&self, delay: Option<Duration>) {
        self.state.write().await.delay = delay;
    }
}

#[async_trait]
impl RecommendationService for InMemoryRecommendationService {
    async fn get_recommendations(&self, item_id: ItemId) -> Result<Vec<Recommendation>> {
        let delay = self.state.read().await.delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.read().await;
        if let Some(failure) = &state.failure {
            return Err(failure.clone());
        }
        Ok(state.by_product.get(&item_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use domain::RecommendationSummary;

    use super::*;

    #[tokio::test]
    async fn test_lists_keep_insertion_order() {
        let service = InMemoryRecommendationService::new();
        let parent = ItemId::new(1).unwrap();
        for rid in [3, 1, 2] {
            service
                .insert(RecommendationSummary::new(rid, "a", 1, "c").to_recommendation(parent))
                .await;
        }

        let ids: Vec<i64> = service
            .get_recommendations(parent)
            .await
            .unwrap()
            .iter()
            .map(|r| r.recommendation_id)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_unknown_product_has_no_recommendations() {
        let service = InMemoryRecommendationService::new();
        let list = service
            .get_recommendations(ItemId::new(9).unwrap())
            .await
            .unwrap();
        assert!(list.is_empty());
    }
}
