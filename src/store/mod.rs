//! Event store gateway.
//!
//! The rest of the service only sees the [`EventStore`] trait: an append-only
//! `insert` and a full `list_all` ordered newest-first. Two backends exist:
//!
//! - [`MemoryEventStore`]: a vector behind a lock, for tests and throwaway runs
//! - [`JsonlEventStore`]: an fsync'd JSON Lines file, replayed on open
//!
//! # Ordering
//!
//! `list_all` sorts by the event's `timestamp` string, descending. For
//! well-formed ISO-8601 timestamps this is chronological order. Records with
//! equal timestamps have no guaranteed relative order.

use async_trait::async_trait;
use std::io;
use thiserror::Error;

use crate::types::{Event, EventId, StoredEvent};

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlEventStore;
pub use memory::MemoryEventStore;

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error reading or writing the backing file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A record could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend cannot serve requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Append-only persistence for canonical events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends `event` and returns the identifier assigned to it.
    ///
    /// Existing records are never modified, reordered, or deduplicated.
    async fn insert(&self, event: Event) -> Result<EventId>;

    /// Returns every stored record, newest timestamp first.
    async fn list_all(&self) -> Result<Vec<StoredEvent>>;
}

/// Copies `records` (given in insertion order) into newest-first order.
pub(crate) fn newest_first<'a, I>(records: I) -> Vec<StoredEvent>
where
    I: DoubleEndedIterator<Item = &'a StoredEvent>,
{
    let mut sorted: Vec<StoredEvent> = records.rev().cloned().collect();
    sorted.sort_by(|a, b| b.event.timestamp().cmp(a.event.timestamp()));
    sorted
}
