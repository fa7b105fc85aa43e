//! Webhook receiver endpoint.
//!
//! Accepts GitHub webhook deliveries, normalizes them, and stores the ones
//! that map to a canonical event. Deliveries that don't map are acknowledged
//! as ignored with the same 200 status, so GitHub never retries them.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::AppState;
use crate::store::StoreError;
use crate::webhooks::normalize;

/// Header name for GitHub event type.
pub const HEADER_EVENT: &str = "x-github-event";

/// Outcome reported in a [`Receipt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Success,
    Ignored,
    Error,
}

/// JSON body returned by the webhook endpoints: `{"status": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub status: ReceiptStatus,
    pub message: String,
}

impl Receipt {
    pub fn success() -> Self {
        Receipt {
            status: ReceiptStatus::Success,
            message: "Event received".to_string(),
        }
    }

    pub fn ignored(event_type: &str) -> Self {
        Receipt {
            status: ReceiptStatus::Ignored,
            message: format!("Event type '{event_type}' not handled"),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Receipt {
            status: ReceiptStatus::Error,
            message: message.into(),
        }
    }
}

/// Errors that can occur when receiving a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Invalid JSON body.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The event could not be persisted.
    #[error("failed to store event: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WebhookError::InvalidJson(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            // The cause is logged by the handler; clients get a generic message.
            WebhookError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store event".to_string(),
            ),
        };

        (status, Json(Receipt::error(message))).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Header `X-GitHub-Event`: event type (e.g. "push", "pull_request")
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 200 `{"status":"success","message":"Event received"}`: event stored
/// - 200 `{"status":"ignored","message":"Event type '<tag>' not handled"}`:
///   nothing to record (unknown tag or unhandled pull request action)
/// - 400: body is not JSON
/// - 500: the store failed
///
/// # Example
///
/// ```ignore
/// POST /webhook/receiver HTTP/1.1
/// X-GitHub-Event: push
/// Content-Type: application/json
///
/// {"ref": "refs/heads/main", "head_commit": {...}}
///
/// HTTP/1.1 200 OK
///
/// {"status": "success", "message": "Event received"}
/// ```
pub async fn receiver_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Receipt>, WebhookError> {
    // A missing header is not an error: the delivery is simply not recognized.
    let event_type = get_header(&headers, HEADER_EVENT).unwrap_or_default();

    let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        warn!(event_type = %event_type, error = %e, "Webhook body is not valid JSON");
        e
    })?;

    let Some(event) = normalize(&event_type, &payload) else {
        debug!(event_type = %event_type, "Ignoring webhook");
        return Ok(Json(Receipt::ignored(&event_type)));
    };

    let kind = event.kind();
    let summary = event.to_string();

    match app_state.store().insert(event).await {
        Ok(id) => {
            info!(
                event_id = %id,
                event_type = %event_type,
                kind = %kind,
                summary = %summary,
                "Stored event"
            );
            Ok(Json(Receipt::success()))
        }
        Err(e) => {
            error!(
                event_type = %event_type,
                kind = %kind,
                error = %e,
                "Failed to store event"
            );
            Err(WebhookError::Store(e))
        }
    }
}

/// Extracts a header value as a string, if present and valid UTF-8.
fn get_header(headers: &HeaderMap, name: &'static str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
