//! Downstream side of the change-event flow.
//!
//! Each domain service consumes its own topic: a [`MessageProcessor`]
//! decodes records into [`event_bus::ChangeEvent`]s and applies them to an
//! [`EntityStore`], and a [`PartitionConsumer`] feeds it one partition at a
//! time from a tracked [`ConsumerPosition`]. A record that cannot be applied
//! is logged and skipped.

pub mod error;
pub mod partition;
pub mod processor;
pub mod store;

pub use error::{EventProcessingError, Result};
pub use partition::{ConsumerPosition, PartitionConsumer, PartitionSource, PollSummary};
pub use processor::MessageProcessor;
pub use store::{
    Entity, EntityStore, InMemoryEntityStore, ProductStore, RecommendationStore, ReviewStore,
};
