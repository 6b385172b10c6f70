use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use ingest::{RawSaveRequest, SaveOutcome};
use serde::Serialize;
use std::sync::Arc;

/// `{"saved": bool}` plus details of what happened.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

impl From<SaveOutcome> for SaveResponse {
    fn from(outcome: SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Saved {
                document_id,
                chunks,
            } => SaveResponse {
                saved: true,
                document_id: Some(document_id.to_string()),
                chunks: Some(chunks),
                duplicate_of: None,
                similarity: None,
            },
            SaveOutcome::Skipped {
                nearest,
                similarity,
            } => SaveResponse {
                saved: false,
                document_id: None,
                chunks: None,
                duplicate_of: Some(nearest.to_string()),
                similarity: Some(similarity),
            },
        }
    }
}

/// Save a page unless the user already has a near-duplicate of it.
///
/// Every field (`url`, `title`, `text` or `text_content`, `user_id`) is
/// required; a missing or blank one is a 400.
pub async fn save_page(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<RawSaveRequest>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(request) = payload?;
    let outcome = state.recall.save(request).await?;
    Ok(Json(SaveResponse::from(outcome)))
}
