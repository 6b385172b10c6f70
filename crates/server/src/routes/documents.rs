use crate::error::{ServerError, ServerResult};
use crate::routes::search::parse_user;
use crate::state::ServerState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use store::{DocumentId, DocumentSummary};

const MAX_PAGE_SIZE: usize = 200;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Id of the last document of the previous page.
    #[serde(default)]
    pub before: Option<DocumentId>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub documents: Vec<DocumentSummary>,
    /// Cursor for the next, older page; absent once the listing is exhausted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_before: Option<DocumentId>,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: DocumentId,
    pub url: String,
    pub title: String,
    pub text: String,
    pub saved_at: DateTime<Utc>,
    pub chunk_count: usize,
}

/// Newest-first page of a user's saved documents.
pub async fn list_documents(
    State(state): State<Arc<ServerState>>,
    Path(user_id): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ServerResult<impl IntoResponse> {
    let user = parse_user(Some(&user_id))?;
    let Query(query) = query?;
    let limit = query
        .limit
        .unwrap_or(state.config.default_page_size)
        .clamp(1, MAX_PAGE_SIZE);

    let documents = state
        .recall
        .recent_documents(user, query.before, limit)
        .await?;
    let next_before = if documents.len() == limit {
        documents.last().map(|d| d.id)
    } else {
        None
    };
    Ok(Json(ListResponse {
        documents,
        next_before,
    }))
}

/// Stored snapshot of one document.
pub async fn get_document(
    State(state): State<Arc<ServerState>>,
    Path((user_id, document_id)): Path<(String, String)>,
) -> ServerResult<impl IntoResponse> {
    let user = parse_user(Some(&user_id))?;
    let id: DocumentId = document_id
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid document id `{document_id}`")))?;

    let record = state
        .recall
        .load_document(user, id)
        .await?
        .ok_or(ServerError::NotFound)?;
    Ok(Json(DocumentResponse {
        id: record.id,
        url: record.url,
        title: record.title,
        text: record.text,
        saved_at: record.saved_at,
        chunk_count: record.chunk_count,
    }))
}
