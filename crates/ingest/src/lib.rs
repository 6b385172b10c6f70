//! # Recall Ingest
//!
//! Saving one page runs through a fixed sequence of stages:
//!
//! ```text
//! Received -> Fingerprinted -> Skipped
//!                           -> Chunked -> Embedded -> Persisted -> Saved
//! ```
//!
//! - **Received**: [`RawSaveRequest::validate`] requires url, title, text and
//!   a parseable user id.
//! - **Fingerprinted**: the text is encoded and compared with the user's
//!   nearest stored fingerprint. At or above the duplicate threshold the
//!   save is skipped and nothing is written.
//! - **Chunked**: whitespace-normalized text is cut into overlapping
//!   passages, with a title pseudo-chunk when the body lacks the title.
//! - **Embedded**: all chunks go to the embedder in one call.
//! - **Persisted**: chunks are written with bounded concurrency, only the
//!   failed subset retried under [`BackoffPolicy`]. The document record is
//!   written last. A fatal failure removes this attempt's chunks.
//!
//! Failed attempts leave nothing behind, so retrying a whole save is safe
//! and is never judged a duplicate of itself.

mod config;
mod dedup;
mod engine;
mod error;
mod persist;
mod request;
mod serde_millis;

use std::fmt;

use store::DocumentId;

pub use crate::config::{BackoffPolicy, ConfigError, IngestConfig};
pub use crate::dedup::{DuplicateDetector, DuplicateVerdict};
pub use crate::engine::Ingestor;
pub use crate::error::{IngestError, ValidationError};
pub use crate::persist::write_chunks_with_retry;
pub use crate::request::{RawSaveRequest, SaveRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestStage {
    Received,
    Fingerprinted,
    Skipped,
    Chunked,
    Embedded,
    Persisted,
    Saved,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IngestStage::Received => "received",
            IngestStage::Fingerprinted => "fingerprinted",
            IngestStage::Skipped => "skipped",
            IngestStage::Chunked => "chunked",
            IngestStage::Embedded => "embedded",
            IngestStage::Persisted => "persisted",
            IngestStage::Saved => "saved",
        };
        f.write_str(name)
    }
}

/// Successful result of a save.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved {
        document_id: DocumentId,
        chunks: usize,
    },
    /// Near-duplicate of `nearest`; nothing was written.
    Skipped {
        nearest: DocumentId,
        similarity: f32,
    },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }

    pub fn final_stage(&self) -> IngestStage {
        match self {
            SaveOutcome::Saved { .. } => IngestStage::Saved,
            SaveOutcome::Skipped { .. } => IngestStage::Skipped,
        }
    }
}
