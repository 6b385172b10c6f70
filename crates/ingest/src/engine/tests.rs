use super::*;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chunk::ChunkConfig;
use embed::StubEmbedder;
use fingerprint::{FingerprintConfig, PermutationSet};
use store::{
    ChunkHit, DocumentSummary, FingerprintMatch, InMemoryStore, StoreError, UserId,
};

use crate::config::BackoffPolicy;
use crate::request::RawSaveRequest;

/// In-memory store that fails chosen chunk positions a fixed number of
/// times, and optionally the next document write.
#[derive(Default)]
struct FlakyStore {
    inner: InMemoryStore,
    fail_positions: HashMap<u32, usize>,
    attempts: Mutex<HashMap<u32, usize>>,
    fail_next_document: Mutex<bool>,
}

impl FlakyStore {
    fn failing(positions: &[(u32, usize)]) -> Self {
        Self {
            fail_positions: positions.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn attempts_for(&self, position: u32) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .get(&position)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn upsert_document(&self, doc: DocumentRecord) -> Result<(), StoreError> {
        let fail = std::mem::take(&mut *self.fail_next_document.lock().unwrap());
        if fail {
            return Err(StoreError::Write("document table unavailable".into()));
        }
        self.inner.upsert_document(doc).await
    }

    async fn upsert_chunk(&self, chunk: ChunkRecord) -> Result<(), StoreError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let n = attempts.entry(chunk.position).or_insert(0);
            *n += 1;
            *n
        };
        let allowed_failures = self.fail_positions.get(&chunk.position).copied();
        if allowed_failures.is_some_and(|k| attempt <= k) {
            return Err(StoreError::Write(format!(
                "chunk {} rejected (attempt {attempt})",
                chunk.position
            )));
        }
        self.inner.upsert_chunk(chunk).await
    }

    async fn delete_chunks(
        &self,
        user: UserId,
        document_id: DocumentId,
    ) -> Result<usize, StoreError> {
        self.inner.delete_chunks(user, document_id).await
    }

    async fn nearest_fingerprint(
        &self,
        user: UserId,
        vector: &[f32],
    ) -> Result<Option<FingerprintMatch>, StoreError> {
        self.inner.nearest_fingerprint(user, vector).await
    }

    async fn nearest_chunks(
        &self,
        user: UserId,
        vector: &[f32],
        top_n: usize,
    ) -> Result<Vec<ChunkHit>, StoreError> {
        self.inner.nearest_chunks(user, vector, top_n).await
    }

    async fn recent_documents(
        &self,
        user: UserId,
        before: Option<DocumentId>,
        limit: usize,
    ) -> Result<Vec<DocumentSummary>, StoreError> {
        self.inner.recent_documents(user, before, limit).await
    }

    async fn load_document(
        &self,
        user: UserId,
        id: DocumentId,
    ) -> Result<Option<DocumentRecord>, StoreError> {
        self.inner.load_document(user, id).await
    }
}

/// Store whose fingerprint lookup always fails.
struct UnreadableStore;

#[async_trait]
impl DocumentStore for UnreadableStore {
    async fn upsert_document(&self, _doc: DocumentRecord) -> Result<(), StoreError> {
        panic!("upsert_document must not be reached")
    }

    async fn upsert_chunk(&self, _chunk: ChunkRecord) -> Result<(), StoreError> {
        panic!("upsert_chunk must not be reached")
    }

    async fn delete_chunks(&self, _: UserId, _: DocumentId) -> Result<usize, StoreError> {
        Ok(0)
    }

    async fn nearest_fingerprint(
        &self,
        _: UserId,
        _: &[f32],
    ) -> Result<Option<FingerprintMatch>, StoreError> {
        Err(StoreError::Read("connection reset".into()))
    }

    async fn nearest_chunks(
        &self,
        _: UserId,
        _: &[f32],
        _: usize,
    ) -> Result<Vec<ChunkHit>, StoreError> {
        Ok(Vec::new())
    }

    async fn recent_documents(
        &self,
        _: UserId,
        _: Option<DocumentId>,
        _: usize,
    ) -> Result<Vec<DocumentSummary>, StoreError> {
        Ok(Vec::new())
    }

    async fn load_document(
        &self,
        _: UserId,
        _: DocumentId,
    ) -> Result<Option<DocumentRecord>, StoreError> {
        Ok(None)
    }
}

/// Embedder that fails, or answers with one vector too few.
struct BrokenEmbedder {
    short_by_one: bool,
}

#[async_trait]
impl Embedder for BrokenEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if self.short_by_one {
            Ok(vec![vec![0.5; 8]; texts.len().saturating_sub(1)])
        } else {
            Err(EmbedError::Request("HTTP error 503".into()))
        }
    }

    fn dimension(&self) -> usize {
        8
    }
}

fn article(topic: &str, sentences: usize) -> String {
    (0..sentences)
        .map(|i| format!("Paragraph {i} of the {topic} article covers detail {topic}{i} at length."))
        .collect::<Vec<_>>()
        .join(" ")
}

fn ingestor_with(store: Arc<dyn DocumentStore>, embedder: Arc<dyn Embedder>) -> Ingestor {
    let fp_cfg = FingerprintConfig::default();
    let perms = Arc::new(PermutationSet::generate_with_seed(fp_cfg.num_minhashes, 7));
    let fingerprinter = Arc::new(Fingerprinter::new(fp_cfg, perms).unwrap());
    let chunker = Arc::new(Chunker::new(ChunkConfig::default().with_max_tokens(30)).unwrap());
    Ingestor::new(
        fingerprinter,
        chunker,
        embedder,
        store,
        IngestConfig::default(),
    )
    .unwrap()
}

fn ingestor(store: Arc<dyn DocumentStore>) -> Ingestor {
    ingestor_with(store, Arc::new(StubEmbedder::new(64)))
}

fn request(user: UserId, topic: &str) -> RawSaveRequest {
    RawSaveRequest::new(
        format!("https://example.com/{topic}"),
        format!("All about {topic}"),
        article(topic, 12),
        user,
    )
}

// ==== Happy path and duplicates ====

#[tokio::test]
async fn saves_then_skips_identical_page() {
    let store = Arc::new(InMemoryStore::new());
    let ingestor = ingestor(store.clone());
    let user = UserId::new();

    let first = ingestor.save(request(user, "rust")).await.unwrap();
    let SaveOutcome::Saved { document_id, chunks } = first else {
        panic!("expected first save to persist, got {first:?}");
    };
    assert!(chunks > 1);
    assert_eq!(store.chunk_count(user), chunks);

    let doc = store.load_document(user, document_id).await.unwrap().unwrap();
    assert_eq!(doc.chunk_count, chunks);
    assert_eq!(doc.url, "https://example.com/rust");

    let second = ingestor.save(request(user, "rust")).await.unwrap();
    match second {
        SaveOutcome::Skipped {
            nearest,
            similarity,
        } => {
            assert_eq!(nearest, document_id);
            assert!(similarity >= 0.95);
        }
        other => panic!("expected skip, got {other:?}"),
    }
    assert_eq!(second.final_stage(), IngestStage::Skipped);
    assert_eq!(store.document_count(user), 1);
    assert_eq!(store.chunk_count(user), chunks);
}

#[tokio::test]
async fn different_page_is_saved() {
    let store = Arc::new(InMemoryStore::new());
    let ingestor = ingestor(store.clone());
    let user = UserId::new();

    assert!(ingestor.save(request(user, "rust")).await.unwrap().is_saved());
    assert!(ingestor.save(request(user, "gardening")).await.unwrap().is_saved());
    assert_eq!(store.document_count(user), 2);
}

#[tokio::test]
async fn duplicates_are_scoped_per_user() {
    let store = Arc::new(InMemoryStore::new());
    let ingestor = ingestor(store.clone());
    let alice = UserId::new();
    let bob = UserId::new();

    assert!(ingestor.save(request(alice, "rust")).await.unwrap().is_saved());
    assert!(ingestor.save(request(bob, "rust")).await.unwrap().is_saved());
    assert_eq!(store.document_count(alice), 1);
    assert_eq!(store.document_count(bob), 1);
}

#[tokio::test]
async fn short_page_saved_twice_is_skipped() {
    let store = Arc::new(InMemoryStore::new());
    let ingestor = ingestor(store.clone());
    let user = UserId::new();
    let note = || RawSaveRequest::new("https://example.com/note", "Note", "Buy milk today", user);

    let first = ingestor.save(note()).await.unwrap();
    let SaveOutcome::Saved { document_id, .. } = first else {
        panic!("expected first save to persist, got {first:?}");
    };
    let second = ingestor.save(note()).await.unwrap();
    assert!(
        matches!(second, SaveOutcome::Skipped { nearest, similarity } if nearest == document_id && similarity > 0.99),
        "got {second:?}"
    );
    assert_eq!(store.document_count(user), 1);
}

#[tokio::test]
async fn title_chunk_leads_when_body_lacks_title() {
    let store = Arc::new(InMemoryStore::new());
    let ingestor = ingestor(store.clone());
    let user = UserId::new();

    ingestor.save(request(user, "rust")).await.unwrap();
    let hits = store
        .nearest_chunks(user, &StubEmbedder::new(64).embed_text("All about rust"), 50)
        .await
        .unwrap();
    let title_hit = hits.iter().find(|h| h.position == 0).unwrap();
    assert_eq!(title_hit.text, "All about rust");
}

// ==== Validation ====

#[tokio::test]
async fn missing_field_is_rejected_before_any_work() {
    let ingestor = ingestor(Arc::new(UnreadableStore));
    let mut raw = request(UserId::new(), "rust");
    raw.title = None;

    let err = ingestor.save(raw).await.unwrap_err();
    assert_eq!(
        err,
        IngestError::Validation(crate::ValidationError::MissingField("title"))
    );
}

#[tokio::test]
async fn read_failure_is_fatal() {
    let ingestor = ingestor(Arc::new(UnreadableStore));
    let err = ingestor.save(request(UserId::new(), "rust")).await.unwrap_err();
    assert!(matches!(err, IngestError::StorageRead(_)));
    assert_eq!(err.stage(), IngestStage::Fingerprinted);
}

// ==== Embedding failures ====

#[tokio::test]
async fn embedding_failure_writes_nothing() {
    let store = Arc::new(InMemoryStore::new());
    let ingestor = ingestor_with(store.clone(), Arc::new(BrokenEmbedder { short_by_one: false }));
    let user = UserId::new();

    let err = ingestor.save(request(user, "rust")).await.unwrap_err();
    assert!(matches!(err, IngestError::Embedding(EmbedError::Request(_))));
    assert_eq!(store.chunk_count(user), 0);
    assert_eq!(store.document_count(user), 0);
}

#[tokio::test]
async fn short_embedding_batch_is_rejected() {
    let store = Arc::new(InMemoryStore::new());
    let ingestor = ingestor_with(store.clone(), Arc::new(BrokenEmbedder { short_by_one: true }));
    let user = UserId::new();

    let err = ingestor.save(request(user, "rust")).await.unwrap_err();
    assert!(matches!(
        err,
        IngestError::Embedding(EmbedError::CountMismatch { .. })
    ));
    assert_eq!(store.chunk_count(user), 0);
}

// ==== Bulk chunk writes ====

#[tokio::test(start_paused = true)]
async fn retries_only_failed_chunks_with_backoff() {
    let store = Arc::new(FlakyStore::failing(&[(1, 2)]));
    let ingestor = ingestor(store.clone());
    let user = UserId::new();

    let started = tokio::time::Instant::now();
    let outcome = ingestor.save(request(user, "rust")).await.unwrap();
    let waited = started.elapsed();

    let SaveOutcome::Saved { chunks, .. } = outcome else {
        panic!("expected save, got {outcome:?}");
    };
    // 500ms then 1s.
    assert!(waited >= Duration::from_millis(1500), "waited {waited:?}");
    assert!(waited < Duration::from_millis(1600), "waited {waited:?}");
    assert_eq!(store.attempts_for(0), 1);
    assert_eq!(store.attempts_for(1), 3);
    assert_eq!(store.attempts_for(2), 1);
    assert_eq!(store.inner.chunk_count(user), chunks);
    assert_eq!(store.inner.document_count(user), 1);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_roll_back_the_attempt() {
    let store = Arc::new(FlakyStore::failing(&[(2, usize::MAX)]));
    let ingestor = ingestor(store.clone());
    let user = UserId::new();

    let started = tokio::time::Instant::now();
    let err = ingestor.save(request(user, "rust")).await.unwrap_err();
    let waited = started.elapsed();

    assert!(matches!(err, IngestError::StorageWrite(StoreError::Write(_))));
    // 0.5 + 1 + 2 + 4 + 8 + 16 + 32 seconds; the 64s wait is never taken.
    assert!(waited >= Duration::from_millis(63_500), "waited {waited:?}");
    assert!(waited < Duration::from_secs(64), "waited {waited:?}");
    assert_eq!(store.attempts_for(2), 8);
    assert_eq!(store.attempts_for(0), 1);
    assert_eq!(store.inner.chunk_count(user), 0);
    assert_eq!(store.inner.document_count(user), 0);
}

#[tokio::test]
async fn document_write_failure_rolls_back_and_retry_is_not_a_duplicate() {
    let store = Arc::new(FlakyStore::default());
    *store.fail_next_document.lock().unwrap() = true;
    let ingestor = ingestor(store.clone());
    let user = UserId::new();

    let err = ingestor.save(request(user, "rust")).await.unwrap_err();
    assert!(matches!(err, IngestError::StorageWrite(_)));
    assert_eq!(err.stage(), IngestStage::Persisted);
    assert_eq!(store.inner.chunk_count(user), 0);
    assert_eq!(store.inner.document_count(user), 0);

    let retry = ingestor.save(request(user, "rust")).await.unwrap();
    assert!(retry.is_saved());
    assert_eq!(store.inner.document_count(user), 1);
}

#[tokio::test]
async fn custom_backoff_shortens_the_schedule() {
    let store = Arc::new(FlakyStore::failing(&[(0, usize::MAX)]));
    let fp_cfg = FingerprintConfig::default();
    let perms = Arc::new(PermutationSet::generate_with_seed(fp_cfg.num_minhashes, 7));
    let ingestor = Ingestor::new(
        Arc::new(Fingerprinter::new(fp_cfg, perms).unwrap()),
        Arc::new(Chunker::new(ChunkConfig::default()).unwrap()),
        Arc::new(StubEmbedder::new(16)),
        store.clone(),
        IngestConfig::default().with_backoff(BackoffPolicy {
            initial: Duration::from_millis(1),
            ceiling: Duration::from_millis(4),
        }),
    )
    .unwrap();

    let err = ingestor.save(request(UserId::new(), "rust")).await.unwrap_err();
    assert!(matches!(err, IngestError::StorageWrite(_)));
    // 1ms, 2ms, 4ms waits: four attempts in total.
    assert_eq!(store.attempts_for(0), 4);
}

#[test]
fn invalid_config_is_rejected() {
    let fp_cfg = FingerprintConfig::default();
    let perms = Arc::new(PermutationSet::generate_with_seed(fp_cfg.num_minhashes, 7));
    let result = Ingestor::new(
        Arc::new(Fingerprinter::new(fp_cfg, perms).unwrap()),
        Arc::new(Chunker::new(ChunkConfig::default()).unwrap()),
        Arc::new(StubEmbedder::new(16)),
        Arc::new(InMemoryStore::new()),
        IngestConfig::default().with_write_concurrency(0),
    );
    assert_eq!(result.unwrap_err(), ConfigError::InvalidConcurrency);
}
