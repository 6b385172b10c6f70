use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use search::SearchResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use store::UserId;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, alias = "search_text")]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_results: usize,
    pub results: Vec<SearchResult>,
}

pub(crate) fn parse_user(raw: Option<&str>) -> ServerResult<UserId> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("user_id is required".to_string()))?;
    raw.parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid user_id `{raw}`")))
}

/// Ranked documents for a query within one user's archive.
pub async fn search_pages(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let Json(request) = payload?;
    let user = parse_user(request.user_id.as_deref())?;
    let query = request.query.unwrap_or_default();

    let results = state.recall.search(user, &query).await?;
    Ok(Json(SearchResponse {
        query,
        total_results: results.len(),
        results,
    }))
}
