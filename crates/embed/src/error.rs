use thiserror::Error;

/// Errors surfaced by an [`crate::Embedder`]. Every variant aborts the
/// current ingestion or search; none are retried here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmbedError {
    /// Configuration is inconsistent (e.g. an HTTP provider without `api_url`).
    #[error("invalid embed config: {0}")]
    InvalidConfig(String),
    /// Transport failure or non-success HTTP status.
    #[error("embedding request failed: {0}")]
    Request(String),
    /// The service answered with a body we cannot interpret.
    #[error("invalid embedding response: {0}")]
    Response(String),
    #[error("embedding service returned {actual} vectors for {expected} inputs")]
    CountMismatch { expected: usize, actual: usize },
    #[error("embedding dimension {actual} does not match configured {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}
