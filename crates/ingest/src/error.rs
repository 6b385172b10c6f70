//! Error surface of a save.
//!
//! A duplicate is not an error; it is reported as
//! [`SaveOutcome::Skipped`](crate::SaveOutcome::Skipped).

use embed::EmbedError;
use store::StoreError;
use thiserror::Error;

use crate::IngestStage;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid user id `{0}`")]
    InvalidUserId(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    /// Rejected before any fingerprinting work.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// The single embedding call failed. Nothing was written.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbedError),
    /// A document write failed, or the chunk write ran out of retries.
    /// Chunks written by this attempt have been removed.
    #[error("storage write failed: {0}")]
    StorageWrite(StoreError),
    #[error("storage read failed: {0}")]
    StorageRead(StoreError),
}

impl IngestError {
    /// Stage the save was in when it failed.
    pub fn stage(&self) -> IngestStage {
        match self {
            IngestError::Validation(_) => IngestStage::Received,
            IngestError::StorageRead(_) => IngestStage::Fingerprinted,
            IngestError::Embedding(_) => IngestStage::Embedded,
            IngestError::StorageWrite(_) => IngestStage::Persisted,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, IngestError::Validation(_))
    }
}
