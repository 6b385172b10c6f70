use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Owner of a document namespace. All similarity queries are scoped to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Identity of one save. Time-ordered (UUIDv7), so ids sort by save time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Save time embedded in the id, if it is a v7 id.
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        let ts = self.0.get_timestamp()?;
        let (secs, nanos) = ts.to_unix();
        Utc.timestamp_opt(secs as i64, nanos).single()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A persisted page. Written only after all of its chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub user: UserId,
    pub id: DocumentId,
    pub url: String,
    pub title: String,
    pub text: String,
    pub fingerprint: Vec<f32>,
    pub chunk_count: usize,
    pub saved_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            url: self.url.clone(),
            title: self.title.clone(),
            saved_at: self.saved_at,
        }
    }
}

/// One embedded passage; `position` is its index in the document's chunk
/// sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub user: UserId,
    pub document_id: DocumentId,
    pub position: u32,
    pub url: String,
    pub title: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Nearest stored fingerprint and its raw dot-product score.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintMatch {
    pub document_id: DocumentId,
    pub fingerprint: Vec<f32>,
    pub score: f32,
}

/// One nearest-neighbor chunk result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkHit {
    pub document_id: DocumentId,
    pub url: String,
    pub title: String,
    pub position: u32,
    pub text: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub url: String,
    pub title: String,
    pub saved_at: DateTime<Utc>,
}

pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
