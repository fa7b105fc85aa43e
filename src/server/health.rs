//! Liveness endpoint.

use axum::http::StatusCode;

/// Returns 200 with the text "OK" whenever the server is accepting requests.
/// It does not touch the event store.
pub async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}
