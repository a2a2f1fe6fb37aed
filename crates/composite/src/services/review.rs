//! Review service trait, HTTP client and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::ItemId;
use domain::Review;
use tokio::sync::RwLock;

use super::domain_label::REVIEW;
use super::http::HttpUpstream;
use crate::config::ServiceEndpoint;
use crate::error::{CompositeError, Result};

/// Read access to the review service.
#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Lists the reviews of a product; empty when it has none.
    async fn get_reviews(&self, item_id: ItemId) -> Result<Vec<Review>>;
}

/// Review service reached over HTTP at
/// `GET /review?productId={itemId}`.
#[derive(Debug, Clone)]
pub struct HttpReviewService {
    upstream: HttpUpstream,
}

impl HttpReviewService {
    pub fn new(endpoint: ServiceEndpoint) -> Result<Self> {
        Ok(Self {
            upstream: HttpUpstream::new(REVIEW, endpoint)?,
        })
    }
}

#[async_trait]
impl ReviewService for HttpReviewService {
    async fn get_reviews(&self, item_id: ItemId) -> Result<Vec<Review>> {
        let reviews: Vec<Review> = self
            .upstream
            .get_json(&format!("/review?productId={item_id}"))
            .await?;
        tracing::debug!(%item_id, count = reviews.len(), "found reviews");
        Ok(reviews)
    }
}

#[derive(Debug, Default)]
struct InMemoryReviewState {
    by_product: HashMap<ItemId, Vec<Review>>,
    failure: Option<CompositeError>,
    delay: Option<Duration>,
}

/// In-memory review service for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReviewService {
    state: Arc<RwLock<InMemoryReviewState>>,
}

impl InMemoryReviewService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a review to its parent product's list.
    pub async fn insert(&self, review: Review) {
        self.state
            .write()
            .await
            .by_product
            .entry(review.parent_item_id)
            .or_default()
            .push(review);
    }

    pub async fn set_failure(&self, failure: Option<CompositeError>) {
        self.state.write().await.failure = failure;
    }

    pub async fn set_delay(&self, delay: Option<Duration>) {
        self.state.write().await.delay = delay;
    }
}

#[async_trait]
impl ReviewService for InMemoryReviewService {
    async fn get_reviews(&self, item_id: ItemId) -> Result<Vec<Review>> {
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
