//! Workspace umbrella crate for recall, a per-user web page archive.
//!
//! [`Recall`] wires the stage crates into one handle: saves go through
//! [`ingest::Ingestor`] (fingerprint, duplicate check, chunk, embed,
//! persist) and queries through [`search::Searcher`]. Both share one
//! [`store::DocumentStore`] and one read-only permutation set.
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use recall::{Recall, RawSaveRequest, UserId};
//!
//! let recall = Recall::in_memory().unwrap();
//! let user = UserId::new();
//! let text = "Borrowing lets code use a value without taking ownership of it.";
//! let outcome = recall
//!     .save(RawSaveRequest::new("https://doc.rust-lang.org/book", "Borrowing", text, user))
//!     .await
//!     .unwrap();
//! assert!(outcome.is_saved());
//!
//! let results = recall.search(user, "borrowing ownership").await.unwrap();
//! assert_eq!(results[0].url, "https://doc.rust-lang.org/book");
//! # }
//! ```

pub mod config;

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use chunk::{ChunkError, Chunker, HfTokenCounter, TokenCounter, WordCounter};
use embed::{build_embedder, EmbedError, Embedder};
use fingerprint::{FingerprintError, Fingerprinter, PermutationSet};
use tracing::info;

pub use fingerprint::{FINGERPRINT_ALGORITHM, FINGERPRINT_VERSION};
pub use crate::config::{ConfigLoadError, RecallConfig, DEFAULT_PERMUTATION_SEED};
pub use ingest::{IngestError, IngestStage, Ingestor, RawSaveRequest, SaveOutcome, ValidationError};
pub use search::{SearchError, SearchResult, Searcher};
pub use store::{
    DocumentId, DocumentRecord, DocumentStore, DocumentSummary, StoreError, UserId,
};

/// Errors raised while assembling a [`Recall`] from configuration.
#[derive(Debug)]
pub enum RecallError {
    Config(ConfigLoadError),
    Fingerprint(FingerprintError),
    Chunk(ChunkError),
    Embed(EmbedError),
    Store(StoreError),
    Ingest(ingest::ConfigError),
    Search(SearchError),
}

impl fmt::Display for RecallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecallError::Config(err) => write!(f, "config: {err}"),
            RecallError::Fingerprint(err) => write!(f, "fingerprint setup failed: {err}"),
            RecallError::Chunk(err) => write!(f, "chunker setup failed: {err}"),
            RecallError::Embed(err) => write!(f, "embedder setup failed: {err}"),
            RecallError::Store(err) => write!(f, "store setup failed: {err}"),
            RecallError::Ingest(err) => write!(f, "ingest setup failed: {err}"),
            RecallError::Search(err) => write!(f, "search setup failed: {err}"),
        }
    }
}

impl Error for RecallError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RecallError::Config(err) => Some(err),
            RecallError::Fingerprint(err) => Some(err),
            RecallError::Chunk(err) => Some(err),
            RecallError::Embed(err) => Some(err),
            RecallError::Store(err) => Some(err),
            RecallError::Ingest(err) => Some(err),
            RecallError::Search(err) => Some(err),
        }
    }
}

macro_rules! impl_from {
    ($($src:ty => $variant:ident),* $(,)?) => {
        $(impl From<$src> for RecallError {
            fn from(value: $src) -> Self {
                RecallError::$variant(value)
            }
        })*
    };
}

impl_from! {
    ConfigLoadError => Config,
    FingerprintError => Fingerprint,
    ChunkError => Chunk,
    EmbedError => Embed,
    StoreError => Store,
    ingest::ConfigError => Ingest,
    SearchError => Search,
}

/// A configured archive: one ingestor and one searcher over a shared store.
#[derive(Clone)]
pub struct Recall {
    fingerprinter: Arc<Fingerprinter>,
    ingestor: Ingestor,
    searcher: Searcher,
    store: Arc<dyn DocumentStore>,
}

impl fmt::Debug for Recall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recall")
            .field("fingerprinter", &self.fingerprinter)
            .field("ingestor", &self.ingestor)
            .field("searcher", &self.searcher)
            .finish_non_exhaustive()
    }
}

impl Recall {
    /// Build every stage from `cfg`, loading permutations and tokenizer files
    /// and opening the store.
    pub fn from_config(cfg: &RecallConfig) -> Result<Self, RecallError> {
        cfg.validate()?;

        let permutations = match &cfg.fingerprint.permutations_path {
            Some(path) => PermutationSet::load(path)?,
            None => PermutationSet::generate_with_seed(
                cfg.fingerprint.config.num_minhashes,
                cfg.fingerprint.permutation_seed,
            ),
        };
        let fingerprinter = Arc::new(Fingerprinter::new(
            cfg.fingerprint.config.clone(),
            Arc::new(permutations),
        )?);

        let counter: Arc<dyn TokenCounter> = match &cfg.chunk.tokenizer_path {
            Some(path) => Arc::new(HfTokenCounter::from_file(path)?),
            None => Arc::new(WordCounter),
        };
        let chunker = Arc::new(Chunker::with_counter(cfg.chunk.config.clone(), counter)?);

        let embedder = build_embedder(&cfg.embed)?;
        let store = cfg.store.build()?;

        info!(
            store = ?cfg.store,
            provider = ?cfg.embed.provider,
            dimension = cfg.embed.dimension,
            "recall_configured"
        );
        Self::from_parts(
            fingerprinter,
            chunker,
            embedder,
            store,
            cfg.ingest.clone(),
            cfg.search.clone(),
        )
    }

    /// Default configuration: in-memory store, stub embedder, word tokens.
    pub fn in_memory() -> Result<Self, RecallError> {
        Self::from_config(&RecallConfig::default())
    }

    pub fn from_parts(
        fingerprinter: Arc<Fingerprinter>,
        chunker: Arc<Chunker>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
        ingest_cfg: ingest::IngestConfig,
        search_cfg: search::SearchConfig,
    ) -> Result<Self, RecallError> {
        let ingestor = Ingestor::new(
            fingerprinter.clone(),
            chunker,
            embedder.clone(),
            store.clone(),
            ingest_cfg,
        )?;
        let searcher = Searcher::new(embedder, store.clone(), search_cfg)?;
        Ok(Self {
            fingerprinter,
            ingestor,
            searcher,
            store,
        })
    }

    pub async fn save(&self, raw: RawSaveRequest) -> Result<SaveOutcome, IngestError> {
        self.ingestor.save(raw).await
    }

    pub async fn search(
        &self,
        user: UserId,
        query: &str,
    ) -> Result<Vec<SearchResult>, SearchError> {
        self.searcher.search(user, query).await
    }

    /// Newest-first page of the user's documents older than `before`.
    pub async fn recent_documents(
        &self,
        user: UserId,
        before: Option<DocumentId>,
        limit: usize,
    ) -> Result<Vec<DocumentSummary>, StoreError> {
        self.store.recent_documents(user, before, limit).await
    }

    pub async fn load_document(
        &self,
        user: UserId,
        id: DocumentId,
    ) -> Result<Option<DocumentRecord>, StoreError> {
        self.store.load_document(user, id).await
    }

    /// Fingerprint similarity of two texts under this archive's encoder.
    pub fn compare(&self, a: &str, b: &str) -> f32 {
        self.fingerprinter
            .encode(a)
            .similarity(&self.fingerprinter.encode(b))
    }

    pub fn fingerprinter(&self) -> &Arc<Fingerprinter> {
        &self.fingerprinter
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }

    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}
