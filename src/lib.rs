//! Webhook Events - receives GitHub webhooks and serves a feed of repository activity.
//!
//! Push, pull request, and merge deliveries are normalized into a canonical
//! [`types::Event`], appended to an [`store::EventStore`], and served back
//! newest-first over HTTP.

pub mod config;
pub mod server;
pub mod store;
pub mod types;
pub mod webhooks;

#[cfg(test)]
mod test_utils;
