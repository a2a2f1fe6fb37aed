//! Domain model for the product composite service.
//!
//! This crate holds the entities owned by the three upstream services and
//! the shapes the composite layer builds from them:
//! - [`Product`], [`Recommendation`], [`Review`] as served by each upstream
//! - [`ProductAggregate`], the read-side view merged from all three
//! - [`CreateAggregateRequest`], the write-side request decomposed into
//!   per-domain change events

pub mod composite;
pub mod error;
pub mod product;
pub mod recommendation;
pub mod review;

pub use common::ItemId;
pub use composite::{AggregateWrite, CreateAggregateRequest, ProductAggregate, ServiceAddresses};
pub use error::DomainError;
pub use product::Product;
pub use recommendation::{Recommendation, RecommendationSummary};
pub use review::{Review, ReviewSummary};
