use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Ranking limits.
///
/// `candidates` chunk hits are fetched, at most `per_document` of them count
/// toward a document's total, and `max_results` documents are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    pub candidates: usize,
    pub per_document: usize,
    pub max_results: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            candidates: 50,
            per_document: 3,
            max_results: 10,
        }
    }
}

impl RankConfig {
    pub fn with_candidates(mut self, candidates: usize) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_per_document(mut self, per_document: usize) -> Self {
        self.per_document = per_document;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        for (name, value) in [
            ("candidates", self.candidates),
            ("per_document", self.per_document),
            ("max_results", self.max_results),
        ] {
            if value == 0 {
                return Err(SearchError::InvalidConfig(format!("{name} must be >= 1")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    #[serde(flatten)]
    pub rank: RankConfig,
    /// Prepended to every query before it is embedded.
    pub query_prefix: String,
}

impl SearchConfig {
    pub fn with_rank(mut self, rank: RankConfig) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_query_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.query_prefix = prefix.into();
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        self.rank.validate()
    }
}
