use thiserror::Error;

/// Storage failures. Read and write failures stay distinct so callers can
/// apply the right policy (only bulk chunk writes are ever retried).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("record codec error: {0}")]
    Codec(String),
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn read<E: std::fmt::Display>(err: E) -> Self {
        Self::Read(err.to_string())
    }

    pub fn write<E: std::fmt::Display>(err: E) -> Self {
        Self::Write(err.to_string())
    }

    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for StoreError {
    fn from(e: bincode::error::EncodeError) -> Self {
        StoreError::Codec(e.to_string())
    }
}

impl From<bincode::error::DecodeError> for StoreError {
    fn from(e: bincode::error::DecodeError) -> Self {
        StoreError::Codec(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Codec(format!("zstd: {e}"))
    }
}
