//! redb-backed persistent store.
//!
//! Two tables keyed by `&str`:
//!
//! - `documents`: `"{user}/{document}"` → document record
//! - `chunks`: `"{user}/{document}/{position:08}"` → chunk record
//!
//! Values are zstd-compressed bincode. Keys put every record of a user (and
//! every chunk of a document) in one contiguous range, so per-user scans are
//! range reads. All redb work runs on the blocking pool.
//!
//! ```yaml
//! store:
//!   backend: redb
//!   path: /data/recall.redb
//! ```

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::codec::{decode, encode};
use crate::types::dot;
use crate::{
    top_by_score, ChunkHit, ChunkRecord, DocumentId, DocumentRecord, DocumentStore,
    DocumentSummary, FingerprintMatch, StoreError, UserId,
};

type RecordTable = TableDefinition<'static, &'static str, &'static [u8]>;

const DOCUMENTS: RecordTable = TableDefinition::new("documents");
const CHUNKS: RecordTable = TableDefinition::new("chunks");

/// Persistent [`DocumentStore`] on a single redb file.
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create the database at `path` and make sure both tables exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::create(path.as_ref()).map_err(StoreError::backend)?;

        let write_txn = db.begin_write().map_err(StoreError::backend)?;
        {
            write_txn.open_table(DOCUMENTS).map_err(StoreError::backend)?;
            write_txn.open_table(CHUNKS).map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;

        tracing::info!(path = %path.as_ref().display(), "redb_store_opened");
        Ok(Self { db: Arc::new(db) })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(StoreError::backend)?
    }

    fn put(db: &Database, table: RecordTable, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let write_txn = db.begin_write().map_err(StoreError::write)?;
        {
            let mut t = write_txn.open_table(table).map_err(StoreError::write)?;
            t.insert(key, value).map_err(StoreError::write)?;
        }
        write_txn.commit().map_err(StoreError::write)
    }

    /// Decode every value in `[start, end)` of `table`.
    fn scan<T: serde::de::DeserializeOwned>(
        db: &Database,
        table: RecordTable,
        start: &str,
        end: &str,
    ) -> Result<Vec<T>, StoreError> {
        let read_txn = db.begin_read().map_err(StoreError::read)?;
        let t = read_txn.open_table(table).map_err(StoreError::read)?;
        let mut out = Vec::new();
        for entry in t.range(start..end).map_err(StoreError::read)? {
            let (_, value) = entry.map_err(StoreError::read)?;
            out.push(decode(value.value())?);
        }
        Ok(out)
    }
}

fn user_range(user: UserId) -> (String, String) {
    (format!("{user}/"), format!("{user}0"))
}

fn document_key(user: UserId, id: DocumentId) -> String {
    format!("{user}/{id}")
}

fn chunk_range(user: UserId, id: DocumentId) -> (String, String) {
    (format!("{user}/{id}/"), format!("{user}/{id}0"))
}

fn chunk_key(chunk: &ChunkRecord) -> String {
    format!("{}/{}/{:08}", chunk.user, chunk.document_id, chunk.position)
}

#[async_trait]
impl DocumentStore for RedbStore {
    async fn upsert_document(&self, doc: DocumentRecord) -> Result<(), StoreError> {
        self.blocking(move |db| {
            let bytes = encode(&doc)?;
            Self::put(db, DOCUMENTS, &document_key(doc.user, doc.id), &bytes)
        })
        .await
    }

    async fn upsert_chunk(&self, chunk: ChunkRecord) -> Result<(), StoreError> {
        self.blocking(move |db| {
            let bytes = encode(&chunk)?;
            Self::put(db, CHUNKS, &chunk_key(&chunk), &bytes)
        })
        .await
    }

    async fn delete_chunks(
        &self,
        user: UserId,
        document_id: DocumentId,
    ) -> Result<usize, StoreError> {
        self.blocking(move |db| {
            let (start, end) = chunk_range(user, document_id);
            let write_txn = db.begin_write().map_err(StoreError::write)?;
            let removed = {
                let mut t = write_txn.open_table(CHUNKS).map_err(StoreError::write)?;
                let mut keys = Vec::new();
                for entry in t.range(start.as_str()..end.as_str()).map_err(StoreError::write)? {
                    let (key, _) = entry.map_err(StoreError::write)?;
                    keys.push(key.value().to_string());
                }
                for key in &keys {
                    t.remove(key.as_str()).map_err(StoreError::write)?;
                }
                keys.len()
            };
            write_txn.commit().map_err(StoreError::write)?;
            Ok(removed)
        })
        .await
    }

    async fn nearest_fingerprint(
        &self,
        user: UserId,
        vector: &[f32],
    ) -> Result<Option<FingerprintMatch>, StoreError> {
        let query = vector.to_vec();
        self.blocking(move |db| {
            let (start, end) = user_range(user);
            let docs: Vec<DocumentRecord> = Self::scan(db, DOCUMENTS, &start, &end)?;
            let scored = docs
                .into_iter()
                .map(|doc| (dot(&doc.fingerprint, &query), doc))
                .collect();
            Ok(top_by_score(scored, 1)
                .into_iter()
                .next()
                .map(|(score, doc)| FingerprintMatch {
                    document_id: doc.id,
                    fingerprint: doc.fingerprint,
                    score,
                }))
        })
        .await
    }

    async fn nearest_chunks(
        &self,
        user: UserId,
        vector: &[f32],
        top_n: usize,
    ) -> Result<Vec<ChunkHit>, StoreError> {
        let query = vector.to_vec();
        self.blocking(move |db| {
            let (start, end) = user_range(user);
            let persisted: std::collections::HashSet<DocumentId> =
                Self::scan::<DocumentRecord>(db, DOCUMENTS, &start, &end)?
                    .into_iter()
                    .map(|doc| doc.id)
                    .collect();
            let chunks: Vec<ChunkRecord> = Self::scan(db, CHUNKS, &start, &end)?;
            let scored = chunks
                .into_iter()
                .filter(|chunk| persisted.contains(&chunk.document_id))
                .map(|chunk| (dot(&chunk.embedding, &query), chunk))
                .collect();
            Ok(top_by_score(scored, top_n)
                .into_iter()
                .map(|(score, chunk)| ChunkHit {
                    document_id: chunk.document_id,
                    url: chunk.url,
                    title: chunk.title,
                    position: chunk.position,
                    text: chunk.text,
                    score,
                })
                .collect())
        })
        .await
    }

    async fn recent_documents(
        &self,
        user: UserId,
        before: Option<DocumentId>,
        limit: usize,
    ) -> Result<Vec<DocumentSummary>, StoreError> {
        self.blocking(move |db| {
            let (start, end) = user_range(user);
            let mut docs: Vec<DocumentSummary> =
                Self::scan::<DocumentRecord>(db, DOCUMENTS, &start, &end)?
                    .iter()
                    .filter(|doc| before.map_or(true, |cursor| doc.id < cursor))
                    .map(DocumentRecord::summary)
                    .collect();
            docs.sort_by(|a, b| b.id.cmp(&a.id));
            docs.truncate(limit);
            Ok(docs)
        })
        .await
    }

    async fn load_document(
        &self,
        user: UserId,
        id: DocumentId,
    ) -> Result<Option<DocumentRecord>, StoreError> {
        self.blocking(move |db| {
            let read_txn = db.begin_read().map_err(StoreError::read)?;
            let t = read_txn.open_table(DOCUMENTS).map_err(StoreError::read)?;
            match t
                .get(document_key(user, id).as_str())
                .map_err(StoreError::read)?
            {
                Some(value) => Ok(Some(decode(value.value())?)),
                None => Ok(None),
            }
        })
        .await
    }
}
