//! HTTP server for the webhook event feed.
//!
//! # Endpoints
//!
//! - `POST /webhook/receiver` - Accepts GitHub webhook deliveries
//! - `GET /webhook/events` - Returns stored events as JSON, newest first
//! - `GET /health` - Returns 200 if server is running
//!
//! CORS is permissive so a browser dashboard on another origin can poll the
//! feed.

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::store::EventStore;

pub mod events;
pub mod health;
pub mod webhook;

pub use events::events_handler;
pub use health::health_handler;
pub use webhook::receiver_handler;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor. The store is
/// constructed once at startup and shared by every request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn EventStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        AppState {
            inner: Arc::new(AppStateInner { store }),
        }
    }

    /// Returns the event store.
    pub fn store(&self) -> &dyn EventStore {
        self.inner.store.as_ref()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook/receiver", post(receiver_handler))
        .route("/webhook/events", get(events_handler))
        .route("/health", get(health_handler))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
