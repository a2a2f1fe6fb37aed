use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ItemId;

/// Kind of change carried by an event, as written on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Create,
    Delete,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Create => "CREATE",
            EventType::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a change event asks the downstream service to do.
///
/// A create always carries the entity; a delete never does. A delete removes
/// every entity stored under the event key, not a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction<T> {
    Create(T),
    Delete,
}

/// A change to one downstream domain, keyed by item id.
///
/// Serialized as
/// `{"eventType":"CREATE","key":1,"data":{..},"eventCreatedAt":"..."}`.
/// Decoding rejects a create without data and unknown event types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireEvent<T>", try_from = "WireEvent<T>")]
#[serde(bound(
    serialize = "T: Serialize + Clone",
    deserialize = "T: Deserialize<'de>"
))]
pub struct ChangeEvent<T> {
    key: ItemId,
    action: EventAction<T>,
    created_at: DateTime<Utc>,
}

impl<T> ChangeEvent<T> {
    /// Creates a CREATE event stamped with the current time.
    pub fn create(key: ItemId, entity: T) -> Self {
        Self {
            key,
            action: EventAction::Create(entity),
            created_at: Utc::now(),
        }
    }

    /// Creates a DELETE event stamped with the current time.
    pub fn delete(key: ItemId) -> Self {
        Self {
            key,
            action: EventAction::Delete,
            created_at: Utc::now(),
        }
    }

    /// Overrides the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn key(&self) -> ItemId {
        self.key
    }

    pub fn action(&self) -> &EventAction<T> {
        &self.action
    }

    pub fn into_action(self) -> EventAction<T> {
        self.action
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn event_type(&self) -> EventType {
        match self.action {
            EventAction::Create(_) => EventType::Create,
            EventAction::Delete => EventType::Delete,
        }
    }

    /// Returns the entity of a create, `None` for a delete.
    pub fn payload(&self) -> Option<&T> {
        match &self.action {
            EventAction::Create(entity) => Some(entity),
            EventAction::Delete => None,
        }
    }

    /// Compares key and action, ignoring the creation timestamp.
    pub fn same_change_as(&self, other: &Self) -> bool
    where
        T: PartialEq,
    {
        self.key == other.key && self.action == other.action
    }
}

/// Returned when a wire event violates the create/delete payload rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed {event_type} event for key {key}: {reason}")]
pub struct MalformedEvent {
    pub event_type: EventType,
    pub key: ItemId,
    pub reason: &'static str,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
struct WireEvent<T> {
    event_type: EventType,
    key: ItemId,
    #[serde(default)]
    data: Option<T>,
    event_created_at: DateTime<Utc>,
}

impl<T> From<ChangeEvent<T>> for WireEvent<T> {
    fn from(event: ChangeEvent<T>) -> Self {
        let event_type = event.event_type();
        let data = match event.action {
            EventAction::Create(entity) => Some(entity),
            EventAction::Delete => None,
        };
        Self {
            event_type,
            key: event.key,
            data,
            event_created_at: event.created_at,
        }
    }
}

impl<T> TryFrom<WireEvent<T>> for ChangeEvent<T> {
    type Error = MalformedEvent;

    fn try_from(wire: WireEvent<T>) -> Result<Self, Self::Error> {
        let action = match (wire.event_type, wire.data) {
            (EventType::Create, Some(entity)) => EventAction::Create(entity),
            (EventType::Create, None) => {
                return Err(MalformedEvent {
                    event_type: EventType::Create,
                    key: wire.key,
                    reason: "missing data",
                });
            }
            (EventType::Delete, None) => EventAction::Delete,
            (EventType::Delete, Some(_)) => {
                return Err(MalformedEvent {
                    event_type: EventType::Delete,
                    key: wire.key,
                    reason: "unexpected data",
                });
            }
        };
        Ok(Self {
            key: wire.key,
            action,
            created_at: wire.event_created_at,
        })
    }
}
