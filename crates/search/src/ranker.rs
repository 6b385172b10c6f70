use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use store::{ChunkHit, DocumentId};

use crate::config::RankConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub position: u32,
    pub text: String,
    pub score: f32,
}

/// One ranked document with the chunks that counted toward its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_id: DocumentId,
    pub url: String,
    pub title: String,
    pub chunks: Vec<ScoredChunk>,
    pub total_score: f32,
}

/// Groups chunk hits by document and ranks documents by summed score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ranker {
    config: RankConfig,
}

impl Ranker {
    pub fn new(config: RankConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Rank `hits`, which must arrive highest score first.
    ///
    /// Each document keeps its first `per_document` hits in arrival order;
    /// later hits are dropped and do not count. Documents with equal totals
    /// keep the order in which they first appeared in `hits`.
    pub fn rank(&self, hits: Vec<ChunkHit>) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = Vec::new();
        let mut slot: HashMap<DocumentId, usize> = HashMap::new();

        for hit in hits {
            let index = *slot.entry(hit.document_id).or_insert_with(|| {
                results.push(SearchResult {
                    document_id: hit.document_id,
                    url: hit.url.clone(),
                    title: hit.title.clone(),
                    chunks: Vec::new(),
                    total_score: 0.0,
                });
                results.len() - 1
            });

            let result = &mut results[index];
            if result.chunks.len() >= self.config.per_document {
                continue;
            }
            result.total_score += hit.score;
            result.chunks.push(ScoredChunk {
                position: hit.position,
                text: hit.text,
                score: hit.score,
            });
        }

        // Stable: ties stay in first-appearance order.
        results.sort_by(|a, b| {
            b.total_score
                .partial_cmp(&a.total_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(self.config.max_results);
        results
    }
}
