//! Change events and their asynchronous delivery.
//!
//! - [`ChangeEvent`] is what the composite layer emits for every entity it
//!   creates or deletes downstream
//! - [`EventTransport`] is the seam to the message broker; ordering is only
//!   guaranteed between records that share a partition key
//! - [`InMemoryTransport`] is a partitioned in-process log used by the
//!   server binary and by tests
//! - [`EventPublisher`] serializes events and hands them to a transport,
//!   keyed by item id

pub mod error;
pub mod event;
pub mod memory;
pub mod publisher;
pub mod topic;
pub mod transport;

pub use common::ItemId;
pub use error::{Result, TransportError};
pub use event::{ChangeEvent, EventAction, EventType, MalformedEvent};
pub use memory::InMemoryTransport;
pub use publisher::EventPublisher;
pub use transport::{EventTransport, Record};
