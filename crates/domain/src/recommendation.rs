//! Recommendation entity and its summary shape.

use common::ItemId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Highest rating a recommendation may carry.
pub const MAX_RATING: i32 = 5;

/// A recommendation as served by the recommendation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub parent_item_id: ItemId,
    /// Unique within the parent product.
    pub recommendation_id: i64,
    pub author: String,
    pub rating: i32,
    pub content: String,
    #[serde(default)]
    pub service_address: Option<String>,
}

impl Recommendation {
    /// Returns the summary shape used inside the composite view.
    pub fn summary(&self) -> RecommendationSummary {
        RecommendationSummary {
            recommendation_id: self.recommendation_id,
            author: self.author.clone(),
            rating: self.rating,
            content: self.content.clone(),
        }
    }
}

/// A recommendation without its parent id or service address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSummary {
    pub recommendation_id: i64,
    pub author: String,
    pub rating: i32,
    pub content: String,
}

impl RecommendationSummary {
    pub fn new(
        recommendation_id: i64,
        author: impl Into<String>,
        rating: i32,
        content: impl Into<String>,
    ) -> Self {
        Self {
            recommendation_id,
            author: author.into(),
            rating,
            content: content.into(),
        }
    }

    /// Checks the id and rating bounds.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.recommendation_id < 1 {
            return Err(DomainError::InvalidRecommendationId {
                id: self.recommendation_id,
            });
        }
        if !(0..=MAX_RATING).contains(&self.rating) {
            return Err(DomainError::InvalidRating {
                rating: self.rating,
            });
        }
        Ok(())
    }

    /// Builds the full entity for the given parent, as sent on writes.
    pub fn to_recommendation(&self, parent_item_id: ItemId) -> Recommendation {
        Recommendation {
            parent_item_id,
            recommendation_id: self.recommendation_id,
            author: self.author.clone(),
            rating: self.rating,
            content: self.content.clone(),
            service_address: None,
        }
    }
}
