use fingerprint::Fingerprint;
use store::{DocumentId, DocumentStore, UserId};
use tracing::debug;

use crate::error::IngestError;

/// Verdict for one incoming fingerprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DuplicateVerdict {
    Unique,
    Duplicate {
        nearest: DocumentId,
        similarity: f32,
    },
}

/// Compares a fingerprint against the single nearest one the user already
/// stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicateDetector {
    threshold: f32,
}

impl DuplicateDetector {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Duplicate iff `similarity(nearest, fingerprint) >= threshold`.
    /// A user with no documents always gets `Unique`.
    pub async fn check(
        &self,
        store: &dyn DocumentStore,
        user: UserId,
        fingerprint: &Fingerprint,
    ) -> Result<DuplicateVerdict, IngestError> {
        let nearest = store
            .nearest_fingerprint(user, fingerprint.as_slice())
            .await
            .map_err(IngestError::StorageRead)?;

        let Some(nearest) = nearest else {
            return Ok(DuplicateVerdict::Unique);
        };

        let similarity = fingerprint::similarity(fingerprint.as_slice(), &nearest.fingerprint);
        debug!(
            user_id = %user,
            nearest = %nearest.document_id,
            similarity,
            threshold = self.threshold,
            "dedup_nearest"
        );
        if similarity >= self.threshold {
            Ok(DuplicateVerdict::Duplicate {
                nearest: nearest.document_id,
                similarity,
            })
        } else {
            Ok(DuplicateVerdict::Unique)
        }
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(0.95)
    }
}
