//! Core domain types for the webhook event feed.

pub mod event;
pub mod ids;

pub use event::{Event, EventKind, PrAction, StoredEvent};
pub use ids::EventId;
