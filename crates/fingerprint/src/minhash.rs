//! MinHash over a set of n-gram hashes.
//!
//! Each slot applies one permutation `((h * a + b) mod p) mod 2^32` with
//! 64-bit wrapping multiply and add, then takes the minimum over all hashes.
//! The arithmetic is fixed-width so signatures are bit-reproducible.

use rayon::prelude::*;

use crate::permutations::{PermutationSet, MERSENNE_PRIME};

/// Largest value a permuted hash can take, and the minimum reported for an
/// empty n-gram set.
pub const MAX_HASH: u64 = (1 << 32) - 1;

/// One minimum per permutation (parallel if `use_parallel`).
pub fn minhash_signature(hashes: &[u64], perms: &PermutationSet, use_parallel: bool) -> Vec<u64> {
    if hashes.is_empty() {
        return vec![MAX_HASH; perms.len()];
    }

    if use_parallel {
        perms
            .a()
            .par_iter()
            .zip(perms.b().par_iter())
            .map(|(&a, &b)| compute_slot(hashes, a, b))
            .collect()
    } else {
        perms
            .pairs()
            .map(|(a, b)| compute_slot(hashes, a, b))
            .collect()
    }
}

#[inline]
pub(crate) fn compute_slot(hashes: &[u64], a: u64, b: u64) -> u64 {
    let mut minv = MAX_HASH;
    for &h in hashes {
        let v = permute(h, a, b);
        if v < minv {
            minv = v;
        }
    }
    minv
}

#[inline]
pub(crate) fn permute(h: u64, a: u64, b: u64) -> u64 {
    (h.wrapping_mul(a).wrapping_add(b) % MERSENNE_PRIME) & MAX_HASH
}
