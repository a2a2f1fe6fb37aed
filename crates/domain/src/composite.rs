//! Composite read view and composite write request.

use common::ItemId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::product::Product;
use crate::recommendation::{Recommendation, RecommendationSummary};
use crate::review::{Review, ReviewSummary};

/// Addresses of the instances that took part in building one view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAddresses {
    /// The composite instance itself.
    pub composite: String,
    pub product: String,
    /// Empty when no recommendation was returned.
    pub recommendation: String,
    /// Empty when no review was returned.
    pub review: String,
}

/// Read-only view of a product together with its recommendations and reviews.
///
/// Built fresh for every read and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAggregate {
    pub item_id: ItemId,
    pub name: String,
    pub weight: i32,
    pub recommendations: Vec<RecommendationSummary>,
    pub reviews: Vec<ReviewSummary>,
    pub service_addresses: ServiceAddresses,
}

/// Body of a composite create.
///
/// Ids arrive as raw integers so that bad values surface as validation
/// errors rather than decode failures. Absent secondary lists mean no
/// entities of that kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAggregateRequest {
    pub item_id: i64,
    pub name: String,
    pub weight: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<RecommendationSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<ReviewSummary>>,
}

/// A validated create request split into the entities each upstream owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateWrite {
    pub product: Product,
    pub recommendations: Vec<Recommendation>,
    pub reviews: Vec<Review>,
}

impl AggregateWrite {
    pub fn item_id(&self) -> ItemId {
        self.product.item_id
    }
}

impl CreateAggregateRequest {
    pub fn new(item_id: i64, name: impl Into<String>, weight: i32) -> Self {
        Self {
            item_id,
            name: name.into(),
            weight,
            recommendations: None,
            reviews: None,
        }
    }

    pub fn with_recommendations(mut self, recommendations: Vec<RecommendationSummary>) -> Self {
        self.recommendations = Some(recommendations);
        self
    }

    pub fn with_reviews(mut self, reviews: Vec<ReviewSummary>) -> Self {
        self.reviews = Some(reviews);
        self
    }

    /// Validates the request and decomposes it into per-domain entities.
    ///
    /// Secondary entities keep the order in which they were supplied.
    pub fn into_write(self) -> Result<AggregateWrite, DomainError> {
        let item_id = ItemId::new(self.item_id)?;
        if self.name.trim().is_empty() {
            return Err(DomainError::NameRequired);
        }
        if self.weight < 0 {
            return Err(DomainError::InvalidWeight {
                weight: self.weight,
            });
        }

        let recommendations = self
            .recommendations
            .unwrap_or_default()
            .iter()
            .map(|r| r.validate().map(|()| r.to_recommendation(item_id)))
            .collect::<Result<Vec<_>, _>>()?;

        let reviews = self
            .reviews
            .unwrap_or_default()
            .iter()
            .map(|r| r.validate().map(|()| r.to_review(item_id)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AggregateWrite {
            product: Product::new(item_id, self.name, self.weight),
            recommendations,
            reviews,
        })
    }
}
