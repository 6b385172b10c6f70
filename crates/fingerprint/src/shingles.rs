//! Word n-gram extraction.
//!
//! Text is split on runs of non-word characters (anything other than an
//! alphanumeric character or `_`), so layout and punctuation differences do
//! not reach the hash.

use std::collections::HashSet;

use xxhash_rust::xxh64::xxh64;

/// Words of `text` in order, with empty pieces discarded.
pub fn words(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .collect()
}

/// The set of unique `n`-word n-grams, each joined with a single space.
pub fn word_ngrams(text: &str, n: usize) -> HashSet<String> {
    let words = words(text);
    if n == 0 || words.len() < n {
        return HashSet::new();
    }
    words.windows(n).map(|w| w.join(" ")).collect()
}

/// xxh64 (seed 0) of every unique n-gram, sorted and deduplicated.
pub fn ngram_hashes(text: &str, n: usize) -> Vec<u64> {
    let mut hashes: Vec<u64> = word_ngrams(text, n)
        .iter()
        .map(|gram| xxh64(gram.as_bytes(), 0))
        .collect();
    hashes.sort_unstable();
    hashes.dedup();
    hashes
}
