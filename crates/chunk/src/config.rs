use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chunking parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkConfig {
    /// Token ceiling per chunk, as measured by the active [`crate::TokenCounter`].
    pub max_tokens: usize,
    /// Prepend the title as its own chunk when the body does not contain it.
    pub title_chunk: bool,
}

impl ChunkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_title_chunk(mut self, title_chunk: bool) -> Self {
        self.title_chunk = title_chunk;
        self
    }

    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.max_tokens == 0 {
            return Err(ChunkError::InvalidMaxTokens {
                max_tokens: self.max_tokens,
            });
        }
        Ok(())
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_tokens: 100,
            title_chunk: true,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChunkError {
    #[error("invalid config: max_tokens must be >= 1 (got {max_tokens})")]
    InvalidMaxTokens { max_tokens: usize },

    #[error("failed to load tokenizer from {path}: {reason}")]
    TokenizerLoad { path: String, reason: String },
}
