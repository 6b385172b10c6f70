use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ingest::IngestError;
use search::SearchError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use store::StoreError;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Save failed: {0}")]
    Ingest(#[from] IngestError),

    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Ingest(err) => match err {
                IngestError::Validation(_) => StatusCode::BAD_REQUEST,
                IngestError::Embedding(_) => StatusCode::BAD_GATEWAY,
                IngestError::StorageWrite(_) | IngestError::StorageRead(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Search(err) => match err {
                SearchError::EmptyQuery => StatusCode::BAD_REQUEST,
                SearchError::Embedding(_) => StatusCode::BAD_GATEWAY,
                SearchError::StorageRead(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::NotFound => "NOT_FOUND",
            ServerError::Ingest(IngestError::Validation(_)) => "VALIDATION_ERROR",
            ServerError::Ingest(IngestError::Embedding(_))
            | ServerError::Search(SearchError::Embedding(_)) => "EMBEDDING_ERROR",
            ServerError::Ingest(IngestError::StorageWrite(_)) => "STORAGE_WRITE_ERROR",
            ServerError::Ingest(IngestError::StorageRead(_))
            | ServerError::Search(SearchError::StorageRead(_)) => "STORAGE_READ_ERROR",
            ServerError::Search(SearchError::EmptyQuery) => "VALIDATION_ERROR",
            ServerError::Ingest(_) => "INGEST_ERROR",
            ServerError::Search(_) => "SEARCH_ERROR",
            ServerError::Storage(_) => "STORAGE_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request_failed");
        }

        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(err: JsonRejection) -> Self {
        ServerError::BadRequest(err.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(err: QueryRejection) -> Self {
        ServerError::BadRequest(err.body_text())
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<recall::RecallError> for ServerError {
    fn from(err: recall::RecallError) -> Self {
        ServerError::Config(err.to_string())
    }
}
