//! Review entity and its summary shape.

use common::ItemId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A review as served by the review service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub parent_item_id: ItemId,
    pub review_id: i64,
    pub author: String,
    pub subject: String,
    pub content: String,
    #[serde(default)]
    pub service_address: Option<String>,
}

impl Review {
    pub fn summary(&self) -> ReviewSummary {
        ReviewSummary {
            review_id: self.review_id,
            author: self.author.clone(),
            subject: self.subject.clone(),
            content: self.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub review_id: i64,
    pub author: String,
    pub subject: String,
    pub content: String,
}

impl ReviewSummary {
    pub fn new(
        review_id: i64,
        author: impl Into<String>,
        subject: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            review_id,
            author: author.into(),
            subject: subject.into(),
            content: content.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.review_id < 1 {
            return Err(DomainError::InvalidReviewId { id: self.review_id });
        }
        Ok(())
    }

    pub fn to_review(&self, parent_item_id: ItemId) -> Review {
        Review {
            parent_item_id,
            review_id: self.review_id,
            author: self.author.clone(),
            subject: self.subject.clone(),
            content: self.content.clone(),
            service_address: None,
        }
    }
}
