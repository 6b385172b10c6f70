//! YAML configuration for a whole recall deployment.
//!
//! ```yaml
//! version: "1.0"
//! name: "personal archive"
//!
//! fingerprint:
//!   ngram_size: 5
//!   num_minhashes: 256
//!   band_size: 8
//!   signature_size: 2048
//!   permutations_path: "/etc/recall/permutations.json"
//!
//! chunk:
//!   max_tokens: 100
//!   title_chunk: true
//!   tokenizer_path: "/etc/recall/tokenizer.json"
//!
//! embed:
//!   provider: "openai"
//!   api_url: "https://api.openai.com/v1/embeddings"
//!   api_auth_header: "Bearer sk-..."
//!   model_name: "text-embedding-3-small"
//!   dimension: 1536
//!
//! store:
//!   backend: "redb"
//!   path: "/var/lib/recall/recall.redb"
//!
//! ingest:
//!   duplicate_threshold: 0.95
//!   write_concurrency: 16
//!   backoff:
//!     initial: 500
//!     ceiling: 60000
//!
//! search:
//!   candidates: 50
//!   per_document: 3
//!   max_results: 10
//!   query_prefix: "query: "
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chunk::ChunkConfig;
use embed::EmbedConfig;
use fingerprint::FingerprintConfig;
use ingest::IngestConfig;
use search::SearchConfig;
use serde::{Deserialize, Serialize};
use store::StoreConfig;
use thiserror::Error;

/// Seed used to derive the permutation set when no file is configured.
pub const DEFAULT_PERMUTATION_SEED: u64 = 1_732_584_193;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RecallConfig {
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub fingerprint: FingerprintSection,

    #[serde(default)]
    pub chunk: ChunkSection,

    #[serde(default)]
    pub embed: EmbedConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

/// Encoder parameters plus where the permutation set comes from.
///
/// Every deployment sharing a store must use the same permutations, so a
/// fixed file is preferred. Without one the set is derived from
/// `permutation_seed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintSection {
    #[serde(flatten)]
    pub config: FingerprintConfig,
    pub permutations_path: Option<PathBuf>,
    pub permutation_seed: u64,
}

impl Default for FingerprintSection {
    fn default() -> Self {
        Self {
            config: FingerprintConfig::default(),
            permutations_path: None,
            permutation_seed: DEFAULT_PERMUTATION_SEED,
        }
    }
}

/// Chunker parameters plus an optional Hugging Face `tokenizer.json`;
/// without one, tokens are whitespace words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkSection {
    #[serde(flatten)]
    pub config: ChunkConfig,
    pub tokenizer_path: Option<PathBuf>,
}

impl RecallConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: RecallConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }

        self.fingerprint
            .config
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("fingerprint: {e}")))?;
        self.chunk
            .config
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("chunk: {e}")))?;
        self.embed
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("embed: {e}")))?;
        self.ingest
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("ingest: {e}")))?;
        self.search
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("search: {e}")))?;
        Ok(())
    }
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            fingerprint: FingerprintSection::default(),
            chunk: ChunkSection::default(),
            embed: EmbedConfig::default(),
            store: StoreConfig::default(),
            ingest: IngestConfig::default(),
            search: SearchConfig::default(),
        }
    }
}
