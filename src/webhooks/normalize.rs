//! Webhook payload normalizer.
//!
//! Maps a raw GitHub delivery (the `X-GitHub-Event` tag plus its JSON payload)
//! onto a canonical [`Event`], or `None` when the delivery is not one of the
//! shapes we record.
//!
//! # Recognized shapes
//!
//! | tag            | action   | merged | result                     |
//! |----------------|----------|--------|----------------------------|
//! | `push`         | -        | -      | `push`                     |
//! | `pull_request` | `opened` | -      | `pull_request` / `opened`  |
//! | `pull_request` | `closed` | true   | `merge`                    |
//! | `pull_request` | `closed` | false  | `pull_request` / `closed`  |
//!
//! Everything else is ignored.
//!
//! Normalization never fails. Payload fields that are missing, `null`, or of
//! the wrong JSON type fall back to their defaults: `"Unknown"` for authors,
//! the empty string for branches, and the receive time for timestamps.

use chrono::Utc;
use serde_json::Value;

use super::payload::{bool_at, non_empty_str_at, str_at};
use crate::types::{Event, PrAction};

/// Author recorded when the payload names nobody.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Normalizes a webhook delivery, stamping missing timestamps with the
/// current UTC time.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use webhook_events::types::EventKind;
/// use webhook_events::webhooks::normalize;
///
/// let payload = json!({
///     "ref": "refs/heads/main",
///     "head_commit": {
///         "author": { "username": "octocat" },
///         "timestamp": "2024-01-15T10:00:00Z"
///     }
/// });
///
/// let event = normalize("push", &payload).unwrap();
/// assert_eq!(event.kind(), EventKind::Push);
/// assert_eq!(event.to_branch(), "main");
///
/// assert!(normalize("issues", &payload).is_none());
/// ```
pub fn normalize(event_type: &str, payload: &Value) -> Option<Event> {
    normalize_with(event_type, payload, utc_now_iso)
}

/// Normalizes a webhook delivery using `now` for missing timestamps.
///
/// `now` is called at most once per delivery, and only when the payload has
/// no usable timestamp of its own.
pub fn normalize_with<F>(event_type: &str, payload: &Value, now: F) -> Option<Event>
where
    F: Fn() -> String,
{
    match event_type {
        "push" => Some(normalize_push(payload, &now)),
        "pull_request" => normalize_pull_request(payload, &now),
        _ => None,
    }
}

/// Current UTC time as a naive ISO-8601 string with microseconds and no
/// offset marker, e.g. `2024-01-15T10:00:00.123456`.
pub fn utc_now_iso() -> String {
    Utc::now()
        .naive_utc()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Extracts the branch name from a git ref.
///
/// `refs/heads/<...>/<name>` yields the final path segment. Anything without
/// the branch prefix (tags, bare names, the empty string) passes through.
pub fn branch_from_ref(git_ref: &str) -> &str {
    if git_ref.starts_with(BRANCH_REF_PREFIX) {
        git_ref
            .rsplit_once('/')
            .map_or(git_ref, |(_, branch)| branch)
    } else {
        git_ref
    }
}

fn timestamp_or_now(payload: &Value, path: &[&str], now: &dyn Fn() -> String) -> String {
    match non_empty_str_at(payload, path) {
        Some(ts) => ts.to_string(),
        None => now(),
    }
}

fn normalize_push(payload: &Value, now: &dyn Fn() -> String) -> Event {
    let author = non_empty_str_at(payload, &["head_commit", "author", "username"])
        .or_else(|| str_at(payload, &["head_commit", "author", "name"]))
        .unwrap_or(UNKNOWN_AUTHOR);

    let git_ref = str_at(payload, &["ref"]).unwrap_or("");

    Event::Push {
        author: author.to_string(),
        to_branch: branch_from_ref(git_ref).to_string(),
        timestamp: timestamp_or_now(payload, &["head_commit", "timestamp"], now),
    }
}

fn normalize_pull_request(payload: &Value, now: &dyn Fn() -> String) -> Option<Event> {
    let action = str_at(payload, &["action"]).unwrap_or("");

    let opener = str_at(payload, &["pull_request", "user", "login"]).unwrap_or(UNKNOWN_AUTHOR);
    let from_branch = str_at(payload, &["pull_request", "head", "ref"])
        .unwrap_or("")
        .to_string();
    let to_branch = str_at(payload, &["pull_request", "base", "ref"])
        .unwrap_or("")
        .to_string();

    let event = match action {
        "opened" => Event::PullRequest {
            action: PrAction::Opened,
            author: opener.to_string(),
            from_branch,
            to_branch,
            timestamp: timestamp_or_now(payload, &["pull_request", "created_at"], now),
        },
        "closed" if bool_at(payload, &["pull_request", "merged"]).unwrap_or(false) => {
            // The merger is usually present on merged PRs; the opener is the fallback.
            let merger = str_at(payload, &["pull_request", "merged_by", "login"]).unwrap_or(opener);
            Event::Merge {
                author: merger.to_string(),
                from_branch,
                to_branch,
                timestamp: timestamp_or_now(payload, &["pull_request", "merged_at"], now),
            }
        }
        "closed" => Event::PullRequest {
            action: PrAction::Closed,
            author: opener.to_string(),
            from_branch,
            to_branch,
            timestamp: timestamp_or_now(payload, &["pull_request", "closed_at"], now),
        },
        // synchronize, reopened, labeled, ... are not recorded
        _ => return None,
    };

    Some(event)
}
