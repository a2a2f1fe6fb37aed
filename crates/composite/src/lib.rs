//! Composite orchestration over the product, recommendation and review
//! services.
//!
//! Reads fan out to the three upstreams concurrently and merge into a
//! [`domain::ProductAggregate`]; only the product call is mandatory.
//! Writes decompose into per-domain [`event_bus::ChangeEvent`]s, all keyed
//! by item id, and return once the transport has accepted every event.

pub mod aggregator;
pub mod classify;
pub mod config;
pub mod error;
pub mod pool;
pub mod propagator;
pub mod services;

pub use aggregator::AggregationOrchestrator;
pub use classify::HttpErrorInfo;
pub use config::{ServiceEndpoint, UpstreamConfig};
pub use error::{CompositeError, Result};
pub use pool::WorkerPool;
pub use propagator::WritePropagator;
pub use services::{
    HttpProductService, HttpRecommendationService, HttpReviewService, InMemoryProductService,
    InMemoryRecommendationService, InMemoryReviewService, ProductService,
    RecommendationService, ReviewService,
};
