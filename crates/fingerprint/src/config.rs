//! Configuration and error types for banded MinHash fingerprints.
//!
//! Every parameter here is a deployment constant: fingerprints computed with
//! different values are not comparable, and the stored fingerprints of a
//! deployment must all share one configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters of the MinHash → LSH band → indicator vector pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Configuration schema version.
    ///
    /// Any change that can alter the produced vector must bump this.
    pub version: u32,
    /// Number of consecutive words per n-gram.
    pub ngram_size: usize,
    /// Number of MinHash permutations. Must equal the permutation set length.
    pub num_minhashes: usize,
    /// Number of consecutive minima hashed together into one band.
    pub band_size: usize,
    /// Length of the output vector.
    pub signature_size: usize,
    /// Compute MinHash slots on the rayon pool.
    pub use_parallel: bool,
}

impl FingerprintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ngram_size(mut self, ngram_size: usize) -> Self {
        self.ngram_size = ngram_size;
        self
    }

    pub fn with_num_minhashes(mut self, num_minhashes: usize) -> Self {
        self.num_minhashes = num_minhashes;
        self
    }

    pub fn with_band_size(mut self, band_size: usize) -> Self {
        self.band_size = band_size;
        self
    }

    pub fn with_signature_size(mut self, signature_size: usize) -> Self {
        self.signature_size = signature_size;
        self
    }

    /// Parallel and sequential MinHash produce bit-identical output.
    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Number of LSH bands (`num_minhashes / band_size`).
    pub fn num_bands(&self) -> usize {
        self.num_minhashes / self.band_size.max(1)
    }

    /// Width of each band's slice of the output vector.
    pub fn bits_per_band(&self) -> usize {
        self.signature_size / self.num_bands().max(1)
    }

    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.version < 1 {
            return Err(FingerprintError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if self.ngram_size < 1 {
            return Err(FingerprintError::InvalidConfigNgram {
                ngram_size: self.ngram_size,
            });
        }
        if self.num_minhashes < 1 {
            return Err(FingerprintError::InvalidConfigMinhashes {
                num_minhashes: self.num_minhashes,
            });
        }
        if self.band_size < 1 || self.num_minhashes % self.band_size != 0 {
            return Err(FingerprintError::InvalidConfigBandSize {
                band_size: self.band_size,
                num_minhashes: self.num_minhashes,
            });
        }
        let bands = self.num_bands();
        if self.signature_size < bands || self.signature_size % bands != 0 {
            return Err(FingerprintError::InvalidConfigSignatureSize {
                signature_size: self.signature_size,
                bands,
            });
        }
        Ok(())
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            version: 1,
            ngram_size: 5,
            num_minhashes: 256,
            band_size: 8,
            signature_size: 2048,
            use_parallel: false,
        }
    }
}

/// Errors returned while configuring the encoder or loading permutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("invalid config: ngram_size must be >= 1 (got {ngram_size})")]
    InvalidConfigNgram { ngram_size: usize },

    #[error("invalid config: num_minhashes must be >= 1 (got {num_minhashes})")]
    InvalidConfigMinhashes { num_minhashes: usize },

    #[error("invalid config: band_size {band_size} must be >= 1 and divide num_minhashes {num_minhashes}")]
    InvalidConfigBandSize {
        band_size: usize,
        num_minhashes: usize,
    },

    #[error("invalid config: signature_size {signature_size} must be a positive multiple of the band count {bands}")]
    InvalidConfigSignatureSize { signature_size: usize, bands: usize },

    #[error("permutation set has {actual} permutations, config expects {expected}")]
    PermutationCountMismatch { expected: usize, actual: usize },

    #[error("invalid permutation set: {0}")]
    InvalidPermutations(String),

    #[error("permutation file I/O failed: {0}")]
    PermutationIo(String),

    #[error("permutation file is malformed: {0}")]
    PermutationFormat(String),
}
