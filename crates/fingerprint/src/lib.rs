//! # Recall Fingerprint
//!
//! Near-duplicate sketches for saved pages. Raw text becomes a fixed-length,
//! L2-normalized indicator vector whose dot product with another document's
//! vector rises with the Jaccard similarity of their word n-gram sets, so a
//! plain vector nearest-neighbor query doubles as a near-duplicate check.
//!
//! ## Contract
//!
//! - The encoder is a pure function of `(text, config, permutations)`: no I/O,
//!   no clocks, no global state.
//! - The [`PermutationSet`] is built once at startup and shared by `Arc`.
//!   Fingerprints are only comparable when computed with the same set and the
//!   same [`FingerprintConfig`].
//!
//! ## Core Pipeline
//!
//! 1.  **N-grams**: split on runs of non-word characters and collect the set
//!     of unique `ngram_size`-word n-grams, each hashed with xxh64.
//! 2.  **MinHash**: for every permutation `(a, b)` keep the minimum of
//!     `((h * a + b) mod (2^61 - 1)) mod 2^32` over all n-gram hashes.
//! 3.  **Banding**: every `band_size` consecutive minima are hashed into one
//!     bucket of that band's slice of the output vector.
//! 4.  **Normalize**: one hot cell per band, scaled to unit length.
//!
//! Known caveat: collisions are not length-normalized. A fixed-size edit to a
//! long document changes a smaller share of its n-grams than the same edit to
//! a short one, so long documents are judged duplicates more readily.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use fingerprint::{Fingerprinter, FingerprintConfig, PermutationSet};
//!
//! let config = FingerprintConfig::default();
//! let perms = Arc::new(PermutationSet::generate_with_seed(config.num_minhashes, 1));
//! let encoder = Fingerprinter::new(config, perms).unwrap();
//!
//! let a = encoder.encode("the quick brown fox jumps over the lazy dog");
//! let b = encoder.encode("the quick   brown fox jumps over the lazy dog");
//! assert_eq!(a, b);
//! assert!((a.similarity(&b) - 1.0).abs() < 1e-5);
//! ```

mod bands;
pub mod config;
mod fingerprint;
mod minhash;
pub mod permutations;
mod shingles;

use std::sync::Arc;

pub use crate::bands::l2_normalize_in_place;
pub use crate::config::{FingerprintConfig, FingerprintError};
pub use crate::fingerprint::{dot, similarity, Fingerprint};
pub use crate::minhash::MAX_HASH;
pub use crate::permutations::{PermutationSet, MERSENNE_PRIME};
pub use crate::shingles::{ngram_hashes, word_ngrams, words};

use crate::bands::band_vector;
use crate::minhash::minhash_signature;

/// Current fingerprint algorithm version for this crate.
pub const FINGERPRINT_VERSION: u16 = 1;

/// Human-readable algorithm identifier.
pub const FINGERPRINT_ALGORITHM: &str = "xxh64_minhash_lsh_bands_v1";

/// Text → [`Fingerprint`] encoder bound to one configuration and permutation set.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    config: FingerprintConfig,
    permutations: Arc<PermutationSet>,
}

impl Fingerprinter {
    pub fn new(
        config: FingerprintConfig,
        permutations: Arc<PermutationSet>,
    ) -> Result<Self, FingerprintError> {
        config.validate()?;
        if permutations.len() != config.num_minhashes {
            return Err(FingerprintError::PermutationCountMismatch {
                expected: config.num_minhashes,
                actual: permutations.len(),
            });
        }
        Ok(Self {
            config,
            permutations,
        })
    }

    pub fn config(&self) -> &FingerprintConfig {
        &self.config
    }

    pub fn permutations(&self) -> &Arc<PermutationSet> {
        &self.permutations
    }

    pub fn dimension(&self) -> usize {
        self.config.signature_size
    }

    /// Raw MinHash minima of `text`, one per permutation.
    pub fn minhash(&self, text: &str) -> Vec<u64> {
        let hashes = ngram_hashes(text, self.config.ngram_size);
        minhash_signature(&hashes, &self.permutations, self.config.use_parallel)
    }

    /// Encode `text` into its banded fingerprint.
    pub fn encode(&self, text: &str) -> Fingerprint {
        let cfg = &self.config;

        // Step 1: unique n-gram hashes.
        let hashes = ngram_hashes(text, cfg.ngram_size);

        // Step 2: one minimum per permutation. Text without n-grams yields
        // the sentinel minima, which are banded like any other signature.
        let minima = minhash_signature(&hashes, &self.permutations, cfg.use_parallel);

        // Step 3: one hot cell per band, then unit length.
        let mut vector = band_vector(&minima, cfg.band_size, cfg.signature_size);
        l2_normalize_in_place(&mut vector);
        Fingerprint::from_vec(vector)
    }
}
