//! Entity stores updated by change events.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::ItemId;
use domain::{Product, Recommendation, Review};
use tokio::sync::RwLock;

use crate::Result;

/// An entity owned by one downstream domain.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The item the entity belongs to; also its event key.
    fn item_id(&self) -> ItemId;

    /// Identifies the entity among those sharing its item id.
    fn entity_id(&self) -> i64;
}

impl Entity for Product {
    fn item_id(&self) -> ItemId {
        self.item_id
    }

    fn entity_id(&self) -> i64 {
        self.item_id.as_i64()
    }
}

impl Entity for Recommendation {
    fn item_id(&self) -> ItemId {
        self.parent_item_id
    }

    fn entity_id(&self) -> i64 {
        self.recommendation_id
    }
}

impl Entity for Review {
    fn item_id(&self) -> ItemId {
        self.parent_item_id
    }

    fn entity_id(&self) -> i64 {
        self.review_id
    }
}

/// Storage a message processor applies changes to.
///
/// Both operations must be idempotent: transport delivery is at-least-once,
/// so any event may be applied more than once.
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    /// Inserts the entity, replacing one with the same natural id.
    async fn upsert(&self, entity: T) -> Result<()>;

    /// Removes every entity stored under `item_id`; returns how many.
    async fn delete_all(&self, item_id: ItemId) -> Result<usize>;

    /// Lists the entities stored under `item_id` in insertion order.
    async fn find(&self, item_id: ItemId) -> Vec<T>;
}

/// In-memory entity store.
#[derive(Debug, Clone)]
pub struct InMemoryEntityStore<T: Entity> {
    entries: Arc<RwLock<HashMap<ItemId, Vec<T>>>>,
}

pub type ProductStore = InMemoryEntityStore<Product>;
pub type RecommendationStore = InMemoryEntityStore<Recommendation>;
pub type ReviewStore = InMemoryEntityStore<Review>;

impl<T: Entity> InMemoryEntityStore<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Total number of stored entities.
    pub async fn len(&self) -> usize {
        self.entries.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<T: Entity> Default for InMemoryEntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for InMemoryEntityStore<T> {
    async fn upsert(&self, entity: T) -> Result<()> {
        let mut entries = self.entries.write().await;
        let list = entries.entry(entity.item_id()).or_default();
        match list.iter_mut().find(|e| e.entity_id() == entity.entity_id()) {
            Some(existing) => *existing = entity,
            None => list.push(entity),
        }
        Ok(())
    }

    async fn delete_all(&self, item_id: ItemId) -> Result<usize> {
        let removed = self.entries.write().await.remove(&item_id);
        Ok(removed.map_or(0, |list| list.len()))
    }

    async fn find(&self, item_id: ItemId) -> Vec<T> {
        self.entries
            .read()
            .await
            .get(&item_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use domain::RecommendationSummary;

    use super::*;

    fn id(value: i64) -> ItemId {
        ItemId::new(value).unwrap()
    }

    fn rec(parent: i64, rid: i64, author: &str) -> Recommendation {
        RecommendationSummary::new(rid, author, 3, "c").to_recommendation(id(parent))
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_natural_id() {
        let store = RecommendationStore::new();
        store.upsert(rec(1, 1, "first")).await.unwrap();
        store.upsert(rec(1, 2, "other")).await.unwrap();
        store.upsert(rec(1, 1, "again")).await.unwrap();

        let found = store.find(id(1)).await;
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].author, "again");
        assert_eq!(found[1].author, "other");
    }

    #[tokio::test]
    async fn test_delete_all_removes_every_entity_for_key() {
        let store = RecommendationStore::new();
        store.upsert(rec(1, 1, "a")).await.unwrap();
        store.upsert(rec(1, 2, "a")).await.unwrap();
        store.upsert(rec(2, 1, "a")).await.unwrap();

        assert_eq!(store.delete_all(id(1)).await.unwrap(), 2);
        assert!(store.find(id(1)).await.is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_of_unknown_key_is_noop() {
        let store = ProductStore::new();
        assert_eq!(store.delete_all(id(42)).await.unwrap(), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_products_are_unique_per_item() {
        let store = ProductStore::new();
        store.upsert(Product::new(id(1), "old", 1)).await.unwrap();
        store.upsert(Product::new(id(1), "new", 2)).await.unwrap();

        let found = store.find(id(1)).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "new");
    }
}
