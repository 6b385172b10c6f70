use embed::EmbedError;
use store::StoreError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SearchError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("invalid search config: {0}")]
    InvalidConfig(String),
    #[error("query embedding failed: {0}")]
    Embedding(#[from] EmbedError),
    #[error("chunk lookup failed: {0}")]
    StorageRead(#[from] StoreError),
}
