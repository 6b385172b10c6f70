//! Hash permutation coefficients shared by every MinHash computation.
//!
//! A [`PermutationSet`] is generated once per deployment, written to disk and
//! loaded read-only at startup. Regenerating it silently breaks comparability
//! between fingerprints computed before and after the change.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::FingerprintError;

/// The Mersenne prime `2^61 - 1` used as permutation modulus.
pub const MERSENNE_PRIME: u64 = (1 << 61) - 1;

/// `(a, b)` coefficient pairs of the universal hash family
/// `h_i(x) = ((x * a_i + b_i) mod p) mod 2^32`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermutationSet {
    a: Vec<u64>,
    b: Vec<u64>,
}

impl PermutationSet {
    /// Draw `k` fresh permutations from OS-seeded randomness.
    pub fn generate(k: usize) -> Self {
        Self::generate_from(&mut fastrand::Rng::new(), k)
    }

    /// Deterministic variant of [`PermutationSet::generate`] for tests and
    /// reproducible deployments.
    pub fn generate_with_seed(k: usize, seed: u64) -> Self {
        Self::generate_from(&mut fastrand::Rng::with_seed(seed), k)
    }

    fn generate_from(rng: &mut fastrand::Rng, k: usize) -> Self {
        let mut a = Vec::with_capacity(k);
        let mut b = Vec::with_capacity(k);
        for _ in 0..k {
            let mut candidate = rng.u64(1..MERSENNE_PRIME);
            while gcd(candidate, MERSENNE_PRIME) != 1 {
                candidate = rng.u64(1..MERSENNE_PRIME);
            }
            a.push(candidate);
            b.push(rng.u64(0..MERSENNE_PRIME));
        }
        Self { a, b }
    }

    /// Build a set from explicit coefficients, checking the family invariants.
    pub fn from_parts(a: Vec<u64>, b: Vec<u64>) -> Result<Self, FingerprintError> {
        let set = Self { a, b };
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.a.len() != self.b.len() {
            return Err(FingerprintError::InvalidPermutations(format!(
                "coefficient arrays differ in length ({} vs {})",
                self.a.len(),
                self.b.len()
            )));
        }
        if self.a.is_empty() {
            return Err(FingerprintError::InvalidPermutations(
                "permutation set is empty".into(),
            ));
        }
        for (i, &a) in self.a.iter().enumerate() {
            if a == 0 || a >= MERSENNE_PRIME || gcd(a, MERSENNE_PRIME) != 1 {
                return Err(FingerprintError::InvalidPermutations(format!(
                    "a[{i}] = {a} is not coprime with the modulus"
                )));
            }
        }
        if let Some(i) = self.b.iter().position(|&b| b >= MERSENNE_PRIME) {
            return Err(FingerprintError::InvalidPermutations(format!(
                "b[{i}] = {} is outside [0, modulus)",
                self.b[i]
            )));
        }
        Ok(())
    }

    /// Load and validate a JSON permutation file (`{"a": [...], "b": [...]}`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FingerprintError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| FingerprintError::PermutationIo(e.to_string()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, FingerprintError> {
        let set: Self = serde_json::from_str(raw)
            .map_err(|e| FingerprintError::PermutationFormat(e.to_string()))?;
        set.validate()?;
        Ok(set)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), FingerprintError> {
        let raw = serde_json::to_string(self)
            .map_err(|e| FingerprintError::PermutationFormat(e.to_string()))?;
        std::fs::write(path.as_ref(), raw).map_err(|e| FingerprintError::PermutationIo(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    pub fn a(&self) -> &[u64] {
        &self.a
    }

    pub fn b(&self) -> &[u64] {
        &self.b
    }

    pub(crate) fn pairs(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.a.iter().copied().zip(self.b.iter().copied())
    }
}

fn gcd(mut x: u64, mut y: u64) -> u64 {
    while y != 0 {
        let t = x % y;
        x = y;
        y = t;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn generate_respects_ranges() {
        let set = PermutationSet::generate(128);
        assert_eq!(set.len(), 128);
        assert!(set.a().iter().all(|&a| (1..MERSENNE_PRIME).contains(&a)));
        assert!(set.b().iter().all(|&b| b < MERSENNE_PRIME));
        assert!(set.validate().is_ok());
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let first = PermutationSet::generate_with_seed(32, 7);
        let second = PermutationSet::generate_with_seed(32, 7);
        let other = PermutationSet::generate_with_seed(32, 8);
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn gcd_basics() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(17, MERSENNE_PRIME), 1);
        assert_eq!(gcd(MERSENNE_PRIME, MERSENNE_PRIME), MERSENNE_PRIME);
    }

    #[test]
    fn from_parts_rejects_length_mismatch() {
        let err = PermutationSet::from_parts(vec![1, 2], vec![3]).unwrap_err();
        assert!(matches!(err, FingerprintError::InvalidPermutations(_)));
    }

    #[test]
    fn from_parts_rejects_zero_multiplier() {
        assert!(PermutationSet::from_parts(vec![0], vec![3]).is_err());
    }

    #[test]
    fn from_parts_rejects_b_outside_modulus() {
        assert!(PermutationSet::from_parts(vec![5], vec![MERSENNE_PRIME]).is_err());
    }

    #[test]
    fn save_then_load_preserves_coefficients() {
        let set = PermutationSet::generate_with_seed(16, 99);
        let file = NamedTempFile::new().unwrap();
        set.save(file.path()).unwrap();
        let loaded = PermutationSet::load(file.path()).unwrap();
        assert_eq!(set, loaded);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = PermutationSet::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, FingerprintError::PermutationIo(_)));
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = PermutationSet::from_json("{\"a\": [1]").unwrap_err();
        assert!(matches!(err, FingerprintError::PermutationFormat(_)));
    }
}
