use std::sync::Arc;
use std::time::Instant;

use embed::Embedder;
use metrics::histogram;
use store::{DocumentStore, UserId};
use tracing::info;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::ranker::{Ranker, SearchResult};

/// Query text → embedding → top-N chunk hits → ranked documents.
#[derive(Clone)]
pub struct Searcher {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
    ranker: Ranker,
    query_prefix: String,
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("ranker", &self.ranker)
            .field("query_prefix", &self.query_prefix)
            .finish_non_exhaustive()
    }
}

impl Searcher {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
        config: SearchConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            embedder,
            store,
            ranker: Ranker::new(config.rank),
            query_prefix: config.query_prefix,
        })
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    pub async fn search(&self, user: UserId, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        let start = Instant::now();

        let text = format!("{}{}", self.query_prefix, query);
        let vector = self.embedder.embed_one(&text).await?;
        let hits = self
            .store
            .nearest_chunks(user, &vector, self.ranker.config().candidates)
            .await?;
        let hit_count = hits.len();
        let results = self.ranker.rank(hits);

        let elapsed = start.elapsed();
        histogram!("recall_search_latency_seconds").record(elapsed.as_secs_f64());
        info!(
            user_id = %user,
            hits = hit_count,
            results = results.len(),
            elapsed_micros = elapsed.as_micros() as u64,
            "search_completed"
        );
        Ok(results)
    }
}
