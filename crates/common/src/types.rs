use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Natural key of a product and of every entity that hangs off it.
///
/// Item ids are strictly positive. The same id is used as the partition
/// key for every change event about the product, its recommendations and
/// its reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ItemId(i64);

/// Returned when a raw value is not a valid item id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid itemId: {0}")]
pub struct InvalidItemId(pub i64);

impl ItemId {
    /// Creates an item id, rejecting zero and negative values.
    pub fn new(value: i64) -> Result<Self, InvalidItemId> {
        if value < 1 {
            return Err(InvalidItemId(value));
        }
        Ok(Self(value))
    }

    /// Returns the raw id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Returns the id rendered as a transport partition key.
    pub fn partition_key(&self) -> String {
        self.0.to_string()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for ItemId {
    type Error = InvalidItemId;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemId> for i64 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}
