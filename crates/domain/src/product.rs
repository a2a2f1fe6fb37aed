//! Core product entity.

use common::ItemId;
use serde::{Deserialize, Serialize};

/// A product as served by the product service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub item_id: ItemId,
    pub name: String,
    pub weight: i32,
    /// Address of the instance that served this product. Absent on writes.
    #[serde(default)]
    pub service_address: Option<String>,
}

impl Product {
    /// Creates a product without a service address, as sent on writes.
    pub fn new(item_id: ItemId, name: impl Into<String>, weight: i32) -> Self {
        Self {
            item_id,
            name: name.into(),
            weight,
            service_address: None,
        }
    }

    /// Sets the address of the serving instance.
    pub fn with_service_address(mut self, address: impl Into<String>) -> Self {
        self.service_address = Some(address.into());
        self
    }
}
