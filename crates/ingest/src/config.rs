use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exponential backoff for the bulk chunk write.
///
/// Only failed chunks are resubmitted. The first wait is `initial`, each
/// later wait doubles, and the write fails once the next wait would exceed
/// `ceiling`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    #[serde(with = "crate::serde_millis")]
    pub initial: Duration,
    #[serde(with = "crate::serde_millis")]
    pub ceiling: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            ceiling: Duration::from_secs(60),
        }
    }
}

impl BackoffPolicy {
    /// The waits this policy allows, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        std::iter::successors(Some(self.initial), |d| d.checked_mul(2))
            .take_while(move |d| *d <= self.ceiling && !d.is_zero())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// A save is skipped when its fingerprint similarity to the user's
    /// nearest stored fingerprint is at least this value.
    pub duplicate_threshold: f32,
    /// Chunk writes in flight during persistence.
    pub write_concurrency: usize,
    pub backoff: BackoffPolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            duplicate_threshold: 0.95,
            write_concurrency: store::DEFAULT_WRITE_CONCURRENCY,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl IngestConfig {
    pub fn with_duplicate_threshold(mut self, threshold: f32) -> Self {
        self.duplicate_threshold = threshold;
        self
    }

    pub fn with_write_concurrency(mut self, concurrency: usize) -> Self {
        self.write_concurrency = concurrency;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.duplicate_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::InvalidThreshold(self.duplicate_threshold));
        }
        if self.write_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        if self.backoff.initial.is_zero() || self.backoff.initial > self.backoff.ceiling {
            return Err(ConfigError::InvalidBackoff {
                initial_ms: self.backoff.initial.as_millis() as u64,
                ceiling_ms: self.backoff.ceiling.as_millis() as u64,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("duplicate_threshold must be within (0, 1] (got {0})")]
    InvalidThreshold(f32),
    #[error("write_concurrency must be >= 1")]
    InvalidConcurrency,
    #[error("backoff initial {initial_ms}ms must be non-zero and not above ceiling {ceiling_ms}ms")]
    InvalidBackoff { initial_ms: u64, ceiling_ms: u64 },
}
