use async_trait::async_trait;
use fxhash::hash64;

use crate::{l2_normalize_in_place, Embedder, EmbedError};

/// Deterministic offline embedder.
///
/// Each lowercased word is hashed into one of `dimension` buckets (the
/// hashing trick) and the counts are L2-normalized, so texts that share
/// vocabulary have proportionally higher cosine similarity. Text without
/// words maps to the zero vector.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    dimension: usize,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let h = hash64(word.to_lowercase().as_bytes());
            v[(h % self.dimension as u64) as usize] += 1.0;
        }
        l2_normalize_in_place(&mut v);
        v
    }
}

impl Default for StubEmbedder {
    fn default() -> Self {
        Self::new(768)
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
