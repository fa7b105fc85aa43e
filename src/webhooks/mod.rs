//! Webhook payload handling for GitHub events.
//!
//! This module provides:
//! - Safe lookups into untyped JSON payloads
//! - Normalization of push and pull request deliveries into canonical events

pub mod normalize;
pub mod payload;

pub use normalize::{UNKNOWN_AUTHOR, branch_from_ref, normalize, normalize_with, utc_now_iso};
