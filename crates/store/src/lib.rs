//! # Recall Store
//!
//! The storage seam consumed by ingestion and search. A [`DocumentStore`]
//! keeps, per user, documents with their fingerprints and ordered, embedded
//! chunks, and answers two nearest-neighbor questions: the single closest
//! fingerprint (duplicate detection) and the top-N closest chunks (search).
//!
//! ## Visibility
//!
//! Chunks are written before their document. [`DocumentStore::nearest_chunks`]
//! only returns chunks whose document record exists, so a save that failed
//! after writing some chunks is invisible, and so is one still in flight.
//!
//! ## Backends
//!
//! - [`InMemoryStore`]: `RwLock`-guarded maps, brute-force scoring.
//! - [`RedbStore`]: redb tables of zstd-compressed bincode records,
//!   brute-force scoring over a user's key range.
//!
//! Neither is an ANN index; both score every vector in the user's namespace.

mod backend;
mod codec;
mod error;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

pub use crate::backend::{InMemoryStore, RedbStore};
pub use crate::error::StoreError;
pub use crate::types::{
    ChunkHit, ChunkRecord, DocumentId, DocumentRecord, DocumentSummary, FingerprintMatch, UserId,
};

/// Default number of chunk writes kept in flight by [`DocumentStore::upsert_chunks`].
pub const DEFAULT_WRITE_CONCURRENCY: usize = 16;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write a document with its fingerprint. Not retried by callers.
    async fn upsert_document(&self, doc: DocumentRecord) -> Result<(), StoreError>;

    async fn upsert_chunk(&self, chunk: ChunkRecord) -> Result<(), StoreError>;

    /// Write `chunks` with at most `concurrency` writes in flight.
    ///
    /// Returns one result per input, in input order; individual failures do
    /// not stop the rest of the batch.
    async fn upsert_chunks(
        &self,
        chunks: &[ChunkRecord],
        concurrency: usize,
    ) -> Vec<Result<(), StoreError>> {
        stream::iter(chunks.iter().cloned())
            .map(|chunk| self.upsert_chunk(chunk))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// Remove every chunk of `document_id`, returning how many were removed.
    async fn delete_chunks(&self, user: UserId, document_id: DocumentId)
        -> Result<usize, StoreError>;

    /// The stored fingerprint with the highest dot product against `vector`.
    async fn nearest_fingerprint(
        &self,
        user: UserId,
        vector: &[f32],
    ) -> Result<Option<FingerprintMatch>, StoreError>;

    /// Up to `top_n` chunks of persisted documents, highest score first.
    async fn nearest_chunks(
        &self,
        user: UserId,
        vector: &[f32],
        top_n: usize,
    ) -> Result<Vec<ChunkHit>, StoreError>;

    /// Newest-first listing of documents, ordered by id.
    ///
    /// `before` is the id of the last document of the previous page; only
    /// strictly older ids are returned. Ids are time-ordered, so documents
    /// saved within the same millisecond still page without gaps.
    async fn recent_documents(
        &self,
        user: UserId,
        before: Option<DocumentId>,
        limit: usize,
    ) -> Result<Vec<DocumentSummary>, StoreError>;

    async fn load_document(
        &self,
        user: UserId,
        id: DocumentId,
    ) -> Result<Option<DocumentRecord>, StoreError>;
}

/// Backend selection.
///
/// ```
/// use store::StoreConfig;
///
/// let cfg: StoreConfig = serde_json::from_str(r#"{"backend": "redb", "path": "/data/recall.redb"}"#).unwrap();
/// assert!(matches!(cfg, StoreConfig::Redb { .. }));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    #[default]
    InMemory,
    Redb {
        path: PathBuf,
    },
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        StoreConfig::InMemory
    }

    pub fn redb<P: Into<PathBuf>>(path: P) -> Self {
        StoreConfig::Redb { path: path.into() }
    }

    pub fn build(&self) -> Result<Arc<dyn DocumentStore>, StoreError> {
        match self {
            StoreConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
            StoreConfig::Redb { path } => Ok(Arc::new(RedbStore::open(path)?)),
        }
    }
}

/// Sort `(score, item)` pairs by descending score, keeping input order for
/// ties, and cut to `limit`.
pub(crate) fn top_by_score<T>(mut scored: Vec<(f32, T)>, limit: usize) -> Vec<(f32, T)> {
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests;
