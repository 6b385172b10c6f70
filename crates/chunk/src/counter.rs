//! Token counting seam.
//!
//! The chunk budget is expressed in the embedding model's units. A plain
//! whitespace word count is the default; deployments that know their model
//! load its Hugging Face `tokenizer.json` instead.

use std::path::Path;

use tokenizers::Tokenizer;

use crate::config::ChunkError;

pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Counts whitespace-separated words.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCounter;

impl TokenCounter for WordCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// Counts sub-word ids produced by a Hugging Face tokenizer, without special
/// tokens.
pub struct HfTokenCounter {
    tokenizer: Tokenizer,
}

impl HfTokenCounter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ChunkError> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::from_file(path).map_err(|e| ChunkError::TokenizerLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { tokenizer })
    }
}

impl TokenCounter for HfTokenCounter {
    fn count(&self, text: &str) -> usize {
        match self.tokenizer.encode(text, false) {
            Ok(encoding) => encoding.get_ids().len(),
            Err(err) => {
                tracing::debug!(error = %err, "tokenizer_encode_failed");
                WordCounter.count(text)
            }
        }
    }
}
