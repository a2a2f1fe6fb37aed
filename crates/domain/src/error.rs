//! Domain error types.

use common::InvalidItemId;
use thiserror::Error;

/// Validation failures for entities and write requests.
///
/// Every variant is caller-correctable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The product id is zero or negative.
    #[error(transparent)]
    InvalidItemId(#[from] InvalidItemId),

    /// Product name is missing.
    #[error("Product name is required")]
    NameRequired,

    /// Weight is negative.
    #[error("Invalid weight: {weight} (must not be negative)")]
    InvalidWeight { weight: i32 },

    /// Recommendation id is zero or negative.
    #[error("Invalid recommendationId: {id}")]
    InvalidRecommendationId { id: i64 },

    /// Review id is zero or negative.
    #[error("Invalid reviewId: {id}")]
    InvalidReviewId { id: i64 },

    /// Rating is outside the accepted range.
    #[error("Invalid rating: {rating} (must be between 0 and 5)")]
    InvalidRating { rating: i32 },
}
