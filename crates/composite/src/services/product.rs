//! Product service trait, HTTP client and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::ItemId;
use domain::Product;
use tokio::sync::RwLock;

use super::domain_label::PRODUCT;
use super::http::HttpUpstream;
use crate::config::ServiceEndpoint;
use crate::error::{CompositeError, Result};

/// Read access to the product service.
#[async_trait]
pub trait ProductService: Send + Sync {
    /// Fetches the product with the given id.
    ///
    /// Fails with `NotFound` when the product does not exist.
    async fn get_product(&self, item_id: ItemId) -> Result<Product>;
}

/// Product service reached over HTTP at `GET /product/{itemId}`.
#[derive(Debug, Clone)]
pub struct HttpProductService {
    upstream: HttpUpstream,
}

impl HttpProductService {
    pub fn new(endpoint: ServiceEndpoint) -> Result<Self> {
        Ok(Self {
            upstream: HttpUpstream::new(PRODUCT, endpoint)?,
        })
    }
}

#[async_trait]
impl ProductService for HttpProductService {
    async fn get_product(&self, item_id: ItemId) -> Result<Product> {
        let product: Product = self
            .upstream
            .get_json(&format!("/product/{item_id}"))
            .await?;
        tracing::debug!(item_id = %product.item_id, "found a product");
        Ok(product)
    }
}

#[derive(Debug, Default)]
struct InMemoryProductState {
    products: HashMap<ItemId, Product>,
    failure: Option<CompositeError>,
    delay: Option<Duration>,
    calls: usize,
}

/// In-memory product service for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductService {
    state: Arc<RwLock<InMemoryProductState>>,
}

impl InMemoryProductService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a product, replacing any product with the same id.
    pub async fn insert(&self, product: Product) {
        self.state
            .write()
            .await
            .products
            .insert(product.item_id, product);
    }

    /// Makes every call fail with `failure` until reset with `None`.
    pub async fn set_failure(&self, failure: Option<CompositeError>) {
        self.state.write().await.failure = failure;
    }

    /// Delays every call by `delay`.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        self.state.write().await.delay = delay;
    }

    pub async fn call_count(&self) -> usize {
        self.state.read().await.calls
    }
}

#[async_trait]
impl ProductService for InMemoryProductService {
    async fn get_product(&self, item_id: ItemId) -> Result<Product> {
        let delay = {
            let mut state = self.state.write().await;
            state.calls += 1;
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.read().await;
        if let Some(failure) = &state.failure {
            return Err(failure.clone());
        }
        state
            .products
            .get(&item_id)
            .cloned()
            .ok_or_else(|| CompositeError::NotFound(format!("No product found for itemId: {item_id}")))
    }
}
