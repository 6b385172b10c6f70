use serde::{Deserialize, Serialize};

/// L2-normalized banded MinHash indicator vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(Vec<f32>);

impl Fingerprint {
    pub fn from_vec(vector: Vec<f32>) -> Self {
        Self(vector)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }

    /// Similarity against another fingerprint, see [`similarity`].
    pub fn similarity(&self, other: &Fingerprint) -> f32 {
        similarity(&self.0, &other.0)
    }
}

impl AsRef<[f32]> for Fingerprint {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Map a raw dot product of unit vectors into `[0, 1]`: `(1 + dot) / 2`.
pub fn similarity(a: &[f32], b: &[f32]) -> f32 {
    (1.0 + dot(a, b)) / 2.0
}
