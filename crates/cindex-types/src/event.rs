//! Change events consumed by the incremental apply path.
//!
//! The primary store's change log is delivered as ordered batches of
//! table-level events. Each event names the table it belongs to so that a
//! consumer can filter down to the tables it tracks.

use serde::{Deserialize, Serialize};

use crate::key_record::KeyRecord;

/// Kind of change applied to the primary store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateAction {
    /// Key inserted
    Put,
    /// Key removed
    Delete,
    /// Key overwritten; carries the prior value when the change log had it
    Update,
    /// Anything the consumer does not recognize; always skipped
    Unknown,
}

impl std::fmt::Display for UpdateAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateAction::Put => write!(f, "put"),
            UpdateAction::Delete => write!(f, "delete"),
            UpdateAction::Update => write!(f, "update"),
            UpdateAction::Unknown => write!(f, "unknown"),
        }
    }
}

/// One record-level change from the primary store's change log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEvent {
    /// Table the change belongs to
    pub table: String,

    /// Kind of change
    pub action: UpdateAction,

    /// Affected key identifier
    pub key: String,

    /// New key record; present for Put and Update
    pub value: Option<KeyRecord>,

    /// Prior key record; present for Update when the change log captured it
    pub old_value: Option<KeyRecord>,
}

impl UpdateEvent {
    /// Create a Put event
    pub fn put(table: impl Into<String>, key: impl Into<String>, value: KeyRecord) -> Self {
        Self {
            table: table.into(),
            action: UpdateAction::Put,
            key: key.into(),
            value: Some(value),
            old_value: None,
        }
    }

    /// Create a Delete event
    pub fn delete(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            action: UpdateAction::Delete,
            key: key.into(),
            value: None,
            old_value: None,
        }
    }

    /// Create an Update event carrying the prior value
    pub fn update(
        table: impl Into<String>,
        key: impl Into<String>,
        value: KeyRecord,
        old_value: Option<KeyRecord>,
    ) -> Self {
        Self {
            table: table.into(),
            action: UpdateAction::Update,
            key: key.into(),
            value: Some(value),
            old_value,
        }
    }
}

/// An ordered, finite batch of update events.
///
/// Order is significant: consumers must apply events exactly in the order
/// the batch delivers them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventBatch {
    events: Vec<UpdateEvent>,
}

impl UpdateEventBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a batch from a list of events, preserving order
    pub fn from_events(events: Vec<UpdateEvent>) -> Self {
        Self { events }
    }

    /// Append an event to the batch
    pub fn push(&mut self, event: UpdateEvent) {
        self.events.push(event);
    }

    /// Iterate events in delivery order
    pub fn iter(&self) -> impl Iterator<Item = &UpdateEvent> {
        self.events.iter()
    }

    /// Number of events in the batch
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
