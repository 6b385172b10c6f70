use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use chunk::Chunker;
use embed::{EmbedError, Embedder};
use fingerprint::Fingerprinter;
use metrics::{counter, histogram};
use store::{ChunkRecord, DocumentId, DocumentRecord, DocumentStore};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::{ConfigError, IngestConfig};
use crate::dedup::{DuplicateDetector, DuplicateVerdict};
use crate::error::IngestError;
use crate::persist::write_chunks_with_retry;
use crate::request::{RawSaveRequest, SaveRequest};
use crate::{IngestStage, SaveOutcome};

#[cfg(test)]
mod tests;

/// Runs one save through fingerprint, duplicate check, chunking, embedding
/// and persistence.
///
/// Holds no mutable state; one instance serves concurrent saves.
#[derive(Clone)]
pub struct Ingestor {
    fingerprinter: Arc<Fingerprinter>,
    chunker: Arc<Chunker>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
    detector: DuplicateDetector,
    config: IngestConfig,
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("detector", &self.detector)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Ingestor {
    pub fn new(
        fingerprinter: Arc<Fingerprinter>,
        chunker: Arc<Chunker>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
        config: IngestConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            fingerprinter,
            chunker,
            embedder,
            store,
            detector: DuplicateDetector::new(config.duplicate_threshold),
            config,
        })
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Validate and save one page.
    ///
    /// A near-duplicate of something the user already saved is reported as
    /// [`SaveOutcome::Skipped`] with nothing written. On any error the store
    /// holds no trace of the attempt.
    pub async fn save(&self, raw: RawSaveRequest) -> Result<SaveOutcome, IngestError> {
        let request = raw.validate()?;
        let span = info_span!("ingest.save", user_id = %request.user, url = %request.url);
        let start = Instant::now();
        let result = self.save_validated(request).instrument(span).await;

        let outcome = match &result {
            Ok(SaveOutcome::Saved { .. }) => "saved",
            Ok(SaveOutcome::Skipped { .. }) => "skipped",
            Err(_) => "failed",
        };
        counter!("recall_saves_total", "outcome" => outcome).increment(1);
        histogram!("recall_save_latency_seconds").record(start.elapsed().as_secs_f64());
        result
    }

    async fn save_validated(&self, request: SaveRequest) -> Result<SaveOutcome, IngestError> {
        let start = Instant::now();
        let SaveRequest {
            url,
            title,
            text,
            user,
        } = request;

        let fingerprint = self.fingerprinter.encode(&text);
        debug!(stage = %IngestStage::Fingerprinted, "ingest_stage");

        if let DuplicateVerdict::Duplicate {
            nearest,
            similarity,
        } = self
            .detector
            .check(self.store.as_ref(), user, &fingerprint)
            .await?
        {
            info!(
                user_id = %user,
                nearest = %nearest,
                similarity,
                elapsed_micros = start.elapsed().as_micros() as u64,
                "ingest_skipped_duplicate"
            );
            return Ok(SaveOutcome::Skipped {
                nearest,
                similarity,
            });
        }

        let doc = self.chunker.chunk_document(&title, &text);
        debug!(stage = %IngestStage::Chunked, chunks = doc.chunks.len(), "ingest_stage");

        let embeddings = self.embedder.embed(&doc.chunks).await?;
        if embeddings.len() != doc.chunks.len() {
            return Err(IngestError::Embedding(EmbedError::CountMismatch {
                expected: doc.chunks.len(),
                actual: embeddings.len(),
            }));
        }
        debug!(stage = %IngestStage::Embedded, "ingest_stage");

        let document_id = DocumentId::new();
        let saved_at = document_id.saved_at().unwrap_or_else(Utc::now);
        let chunk_count = doc.chunks.len();
        let records: Vec<ChunkRecord> = doc
            .chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(position, (chunk_text, embedding))| ChunkRecord {
                user,
                document_id,
                position: position as u32,
                url: url.clone(),
                title: doc.title.clone(),
                text: chunk_text,
                embedding,
            })
            .collect();

        if let Err(err) = write_chunks_with_retry(
            self.store.as_ref(),
            records,
            self.config.write_concurrency,
            &self.config.backoff,
        )
        .await
        {
            self.rollback(user, document_id).await;
            return Err(IngestError::StorageWrite(err));
        }
        debug!(stage = %IngestStage::Persisted, chunks = chunk_count, "ingest_stage");

        let record = DocumentRecord {
            user,
            id: document_id,
            url,
            title: doc.title,
            text: doc.text,
            fingerprint: fingerprint.into_vec(),
            chunk_count,
            saved_at,
        };
        if let Err(err) = self.store.upsert_document(record).await {
            self.rollback(user, document_id).await;
            return Err(IngestError::StorageWrite(err));
        }

        info!(
            user_id = %user,
            document_id = %document_id,
            chunks = chunk_count,
            elapsed_micros = start.elapsed().as_micros() as u64,
            "ingest_saved"
        );
        Ok(SaveOutcome::Saved {
            document_id,
            chunks: chunk_count,
        })
    }

    async fn rollback(&self, user: store::UserId, document_id: DocumentId) {
        match self.store.delete_chunks(user, document_id).await {
            Ok(removed) => debug!(document_id = %document_id, removed, "ingest_rollback"),
            Err(err) => warn!(document_id = %document_id, error = %err, "ingest_rollback_failed"),
        }
    }
}
