//! # Recall Chunk
//!
//! Splits a saved page into token-bounded passages for embedding.
//!
//! Sentences are folded into a running group while the group stays within
//! `max_tokens`. A new group starts with the previous sentence when it still
//! fits next to the incoming one, so consecutive chunks share one sentence of
//! context. A sentence that exceeds the budget alone is bisected on
//! whitespace until each half fits; a single word longer than the budget is
//! dropped.
//!
//! If the title does not appear verbatim in the body it is prepended as an
//! independent pseudo-chunk, making title-only matches retrievable.
//!
//! Output is deterministic for identical input and configuration.
//!
//! ```
//! use chunk::{ChunkConfig, Chunker};
//!
//! let chunker = Chunker::new(ChunkConfig::new().with_max_tokens(8)).unwrap();
//! let doc = chunker.chunk_document(
//!     "Ferris",
//!     "Rust has a mascot. It is a crab. The crab is orange and friendly.",
//! );
//! assert_eq!(doc.chunks[0], "Ferris");
//! assert!(doc.has_title_chunk);
//! ```

pub mod config;
pub mod counter;

use std::collections::VecDeque;
use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

pub use crate::config::{ChunkConfig, ChunkError};
pub use crate::counter::{HfTokenCounter, TokenCounter, WordCounter};

/// Whitespace-normalized document plus its ordered chunk texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDocument {
    pub title: String,
    pub text: String,
    /// Chunk texts in document order; the title pseudo-chunk, if any, first.
    pub chunks: Vec<String>,
    pub has_title_chunk: bool,
}

#[derive(Clone)]
pub struct Chunker {
    config: ChunkConfig,
    counter: Arc<dyn TokenCounter>,
}

impl std::fmt::Debug for Chunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Chunker {
    /// Chunker counting whitespace words.
    pub fn new(config: ChunkConfig) -> Result<Self, ChunkError> {
        Self::with_counter(config, Arc::new(WordCounter))
    }

    pub fn with_counter(
        config: ChunkConfig,
        counter: Arc<dyn TokenCounter>,
    ) -> Result<Self, ChunkError> {
        config.validate()?;
        Ok(Self { config, counter })
    }

    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.counter.count(text)
    }

    /// Normalize title and body, chunk the body and prepend the title
    /// pseudo-chunk when the body does not contain the title.
    pub fn chunk_document(&self, title: &str, text: &str) -> ChunkedDocument {
        let title = normalize_whitespace(title);
        let text = normalize_whitespace(text);
        let mut chunks = self.chunk_text(&text);

        let mut has_title_chunk = false;
        if self.config.title_chunk && !title.is_empty() && !text.contains(&title) {
            if let Some(head) = self.fit_prefix(&title) {
                chunks.insert(0, head);
                has_title_chunk = true;
            }
        }

        ChunkedDocument {
            title,
            text,
            chunks,
            has_title_chunk,
        }
    }

    /// Chunk a body of text into overlapping, budget-bounded passages.
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let max = self.config.max_tokens;
        let mut queue: VecDeque<String> = split_sentences(text).into_iter().collect();

        let mut groups: Vec<Vec<String>> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_tokens = 0usize;
        let mut carry: Option<(String, usize)> = None;

        while let Some(part) = queue.pop_front() {
            let tokens = self.counter.count(&part);

            if tokens > max {
                let words: Vec<&str> = part.split_whitespace().collect();
                if words.len() <= 1 {
                    tracing::warn!(tokens, max_tokens = max, "chunk_word_dropped");
                    continue;
                }
                let mid = words.len() / 2;
                queue.push_front(words[mid..].join(" "));
                queue.push_front(words[..mid].join(" "));
                continue;
            }

            if current_tokens + tokens <= max {
                current.push(part.clone());
                current_tokens += tokens;
            } else {
                if !current.is_empty() {
                    groups.push(std::mem::take(&mut current));
                }
                current_tokens = 0;
                if let Some((prev, prev_tokens)) = carry.take() {
                    if prev_tokens + tokens <= max {
                        current.push(prev);
                        current_tokens = prev_tokens;
                    }
                }
                current.push(part.clone());
                current_tokens += tokens;
            }

            carry = Some((part, tokens));
        }

        if !current.is_empty() {
            groups.push(current);
        }

        groups.into_iter().map(|group| group.join(" ")).collect()
    }

    /// Left halves of `text` until it fits the budget.
    fn fit_prefix(&self, text: &str) -> Option<String> {
        let mut candidate = text.to_string();
        loop {
            if self.counter.count(&candidate) <= self.config.max_tokens {
                return Some(candidate);
            }
            let words: Vec<&str> = candidate.split_whitespace().collect();
            if words.len() <= 1 {
                tracing::warn!(max_tokens = self.config.max_tokens, "title_chunk_dropped");
                return None;
            }
            candidate = words[..words.len() / 2].join(" ");
        }
    }
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// UAX #29 sentences, trimmed, with blank pieces removed.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split_sentence_bounds()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests;
