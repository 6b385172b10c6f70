//! # Recall Search
//!
//! A query is embedded once and answered by a single top-`candidates`
//! nearest-chunk lookup in the user's namespace. [`Ranker`] then groups the
//! hits by document, keeps each document's first `per_document` hits,
//! sums their scores and returns the best `max_results` documents.
//!
//! Scores are not length-normalized: a long page with several relevant
//! chunks can outrank a short page with one excellent chunk.

mod config;
mod error;
mod ranker;
mod searcher;

pub use crate::config::{RankConfig, SearchConfig};
pub use crate::error::SearchError;
pub use crate::ranker::{Ranker, ScoredChunk, SearchResult};
pub use crate::searcher::Searcher;
