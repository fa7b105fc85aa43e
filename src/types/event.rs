//! The canonical event record.
//!
//! Every recognized webhook is reduced to one of three shapes. The record is
//! serialized with an internal `type` tag so that the stored document carries
//! exactly the fields its type needs:
//!
//! ```json
//! {"type":"push","author":"alice","to_branch":"main","timestamp":"2024-01-15T10:00:00Z"}
//! {"type":"pull_request","action":"opened","author":"bob","from_branch":"feature","to_branch":"main","timestamp":"..."}
//! {"type":"merge","author":"carol","from_branch":"feature","to_branch":"main","timestamp":"..."}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::EventId;

/// The three kinds of canonical event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Push,
    PullRequest,
    Merge,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Push => "push",
            EventKind::PullRequest => "pull_request",
            EventKind::Merge => "merge",
        };
        f.write_str(name)
    }
}

/// Pull request actions that produce a `pull_request` event.
///
/// A merged close produces a `merge` event instead, so `Closed` always means
/// closed without merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrAction {
    Opened,
    Closed,
}

/// A normalized webhook event.
///
/// Timestamps are kept as the ISO-8601 strings the source sent (or the
/// receive time when the source omitted one), so ordering is lexicographic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Commits pushed to a branch.
    Push {
        author: String,
        to_branch: String,
        timestamp: String,
    },

    /// A pull request was opened, or closed without merging.
    PullRequest {
        action: PrAction,
        author: String,
        from_branch: String,
        to_branch: String,
        timestamp: String,
    },

    /// A pull request was merged.
    Merge {
        author: String,
        from_branch: String,
        to_branch: String,
        timestamp: String,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Push { .. } => EventKind::Push,
            Event::PullRequest { .. } => EventKind::PullRequest,
            Event::Merge { .. } => EventKind::Merge,
        }
    }

    pub fn author(&self) -> &str {
        match self {
            Event::Push { author, .. }
            | Event::PullRequest { author, .. }
            | Event::Merge { author, .. } => author,
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            Event::Push { timestamp, .. }
            | Event::PullRequest { timestamp, .. }
            | Event::Merge { timestamp, .. } => timestamp,
        }
    }

    pub fn to_branch(&self) -> &str {
        match self {
            Event::Push { to_branch, .. }
            | Event::PullRequest { to_branch, .. }
            | Event::Merge { to_branch, .. } => to_branch,
        }
    }

    /// The pull request head branch. `None` for pushes.
    pub fn from_branch(&self) -> Option<&str> {
        match self {
            Event::Push { .. } => None,
            Event::PullRequest { from_branch, .. } | Event::Merge { from_branch, .. } => {
                Some(from_branch.as_str())
            }
        }
    }

    /// The pull request action. Only `pull_request` events carry one.
    pub fn action(&self) -> Option<PrAction> {
        match self {
            Event::PullRequest { action, .. } => Some(*action),
            _ => None,
        }
    }
}

/// One-line activity summary, e.g. `"alice" pushed to "main" on 2024-01-15T10:00:00Z`.
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Push {
                author,
                to_branch,
                timestamp,
            } => write!(f, "\"{author}\" pushed to \"{to_branch}\" on {timestamp}"),
            Event::PullRequest {
                action,
                author,
                from_branch,
                to_branch,
                timestamp,
            } => {
                let verb = match action {
                    PrAction::Opened => "submitted",
                    PrAction::Closed => "closed",
                };
                write!(
                    f,
                    "\"{author}\" {verb} a pull request from \"{from_branch}\" to \"{to_branch}\" on {timestamp}"
                )
            }
            Event::Merge {
                author,
                from_branch,
                to_branch,
                timestamp,
            } => write!(
                f,
                "\"{author}\" merged branch \"{from_branch}\" to \"{to_branch}\" on {timestamp}"
            ),
        }
    }
}

/// An event as returned by the store, annotated with its identifier.
///
/// The identifier is serialized as `_id` next to the event's own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    #[serde(rename = "_id")]
    pub id: EventId,

    #[serde(flatten)]
    pub event: Event,
}
