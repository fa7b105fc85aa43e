//! In-memory event store.

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{EventStore, Result, newest_first};
use crate::types::{Event, EventId, StoredEvent};

/// Keeps events in a vector for the lifetime of the process.
#[derive(Default)]
pub struct MemoryEventStore {
    records: RwLock<Vec<StoredEvent>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert(&self, event: Event) -> Result<EventId> {
        let id = EventId::generate();
        self.records.write().push(StoredEvent { id, event });
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<StoredEvent>> {
        Ok(newest_first(self.records.read().iter()))
    }
}
