//! API route handlers
//!
//! - `health`: liveness, readiness, metadata and Prometheus metrics
//! - `save`: save a page unless it is a near-duplicate
//! - `search`: ranked semantic search over a user's pages
//! - `documents`: recent-page listing and snapshot retrieval

pub mod documents;
pub mod health;
pub mod save;
pub mod search;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "recall",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/save",
            "/api/v1/search",
            "/api/v1/users/{user_id}/documents",
            "/api/v1/users/{user_id}/documents/{document_id}",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
