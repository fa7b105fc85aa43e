//! Event feed endpoint.
//!
//! Returns every stored event, newest first.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error};

use super::AppState;
use super::webhook::Receipt;
use crate::store::StoreError;
use crate::types::StoredEvent;

/// Errors that can occur when listing events.
#[derive(Debug, Error)]
pub enum EventsError {
    #[error("failed to fetch events: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for EventsError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Receipt::error("Failed to fetch events")),
        )
            .into_response()
    }
}

/// Event feed handler.
///
/// # Response
///
/// - 200 OK with a JSON array of events, each carrying its `_id` as a string
/// - 500 if the store failed
///
/// # Example
///
/// ```ignore
/// GET /webhook/events HTTP/1.1
///
/// HTTP/1.1 200 OK
/// Content-Type: application/json
///
/// [
///   {"_id": "67e55044-...", "type": "merge", "author": "carol", ...},
///   {"_id": "5d8a1c3e-...", "type": "push", "author": "alice", ...}
/// ]
/// ```
pub async fn events_handler(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<StoredEvent>>, EventsError> {
    match app_state.store().list_all().await {
        Ok(events) => {
            debug!(count = events.len(), "Fetched events");
            Ok(Json(events))
        }
        Err(e) => {
            error!(error = %e, "Failed to fetch events");
            Err(EventsError::Store(e))
        }
    }
}
