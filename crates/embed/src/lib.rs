//! # Recall Embed
//!
//! The chunk embedding seam. Ingestion submits a document's whole chunk batch
//! in one [`Embedder::embed`] call and pairs the returned vectors back onto
//! chunks by position; search embeds a single query.
//!
//! Two implementations ship with the crate:
//!
//! - [`ApiEmbedder`]: OpenAI, Hugging Face inference, Gemini batch and custom
//!   JSON endpoints over `reqwest`.
//! - [`StubEmbedder`]: deterministic hashing-trick vectors for tests and
//!   offline deployments.
//!
//! Errors are never retried here. A failed call aborts the caller's
//! ingestion or search.

mod api;
pub mod config;
mod error;
mod stub;

use std::sync::Arc;

use async_trait::async_trait;

pub use crate::api::ApiEmbedder;
pub use crate::config::{EmbedConfig, ProviderKind};
pub use crate::error::EmbedError;
pub use crate::stub::StubEmbedder;
pub use fingerprint::l2_normalize_in_place;

/// Order-preserving text → vector service with a fixed dimension.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// One vector per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    fn dimension(&self) -> usize;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let vectors = self.embed(&[text.to_string()]).await?;
        let actual = vectors.len();
        match <[Vec<f32>; 1]>::try_from(vectors) {
            Ok([vector]) => Ok(vector),
            Err(_) => Err(EmbedError::CountMismatch {
                expected: 1,
                actual,
            }),
        }
    }
}

/// Build the embedder selected by `cfg.provider`.
pub fn build_embedder(cfg: &EmbedConfig) -> Result<Arc<dyn Embedder>, EmbedError> {
    cfg.validate()?;
    match cfg.provider {
        ProviderKind::Stub => Ok(Arc::new(StubEmbedder::new(cfg.dimension))),
        _ => Ok(Arc::new(ApiEmbedder::new(cfg.clone())?)),
    }
}
