//! Upstream service traits with HTTP and in-memory implementations.

mod http;
pub mod product;
pub mod recommendation;
pub mod review;

pub use http::HttpUpstream;
pub use product::{HttpProductService, InMemoryProductService, ProductService};
pub use recommendation::{
    HttpRecommendationService, InMemoryRecommendationService, RecommendationService,
};
pub use review::{HttpReviewService, InMemoryReviewService, ReviewService};

/// Domain labels used in logs and metrics.
pub mod domain_label {
    pub const PRODUCT: &str = "product";
    pub const RECOMMENDATION: &str = "recommendation";
    pub const REVIEW: &str = "review";
}
