use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::types::dot;
use crate::{
    top_by_score, ChunkHit, ChunkRecord, DocumentId, DocumentRecord, DocumentStore,
    DocumentSummary, FingerprintMatch, StoreError, UserId,
};

#[derive(Default)]
struct UserSpace {
    documents: BTreeMap<DocumentId, DocumentRecord>,
    chunks: BTreeMap<(DocumentId, u32), ChunkRecord>,
}

/// Ephemeral store for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<UserId, UserSpace>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<UserId, UserSpace>>, StoreError> {
        self.users
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<UserId, UserSpace>>, StoreError> {
        self.users
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))
    }

    /// Number of chunk records stored for `user`, visible or not.
    pub fn chunk_count(&self, user: UserId) -> usize {
        self.read()
            .map(|users| users.get(&user).map_or(0, |space| space.chunks.len()))
            .unwrap_or(0)
    }

    pub fn document_count(&self, user: UserId) -> usize {
        self.read()
            .map(|users| users.get(&user).map_or(0, |space| space.documents.len()))
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn upsert_document(&self, doc: DocumentRecord) -> Result<(), StoreError> {
        let mut users = self.write()?;
        users
            .entry(doc.user)
            .or_default()
            .documents
            .insert(doc.id, doc);
        Ok(())
    }

    async fn upsert_chunk(&self, chunk: ChunkRecord) -> Result<(), StoreError> {
        let mut users = self.write()?;
        users
            .entry(chunk.user)
            .or_default()
            .chunks
            .insert((chunk.document_id, chunk.position), chunk);
        Ok(())
    }

    async fn delete_chunks(
        &self,
        user: UserId,
        document_id: DocumentId,
    ) -> Result<usize, StoreError> {
        let mut users = self.write()?;
        let Some(space) = users.get_mut(&user) else {
            return Ok(0);
        };
        let before = space.chunks.len();
        space.chunks.retain(|(doc, _), _| *doc != document_id);
        Ok(before - space.chunks.len())
    }

    async fn nearest_fingerprint(
        &self,
        user: UserId,
        vector: &[f32],
    ) -> Result<Option<FingerprintMatch>, StoreError> {
        let users = self.read()?;
        let Some(space) = users.get(&user) else {
            return Ok(None);
        };
        let scored: Vec<(f32, &DocumentRecord)> = space
            .documents
            .values()
            .map(|doc| (dot(&doc.fingerprint, vector), doc))
            .collect();
        Ok(top_by_score(scored, 1)
            .into_iter()
            .next()
            .map(|(score, doc)| FingerprintMatch {
                document_id: doc.id,
                fingerprint: doc.fingerprint.clone(),
                score,
            }))
    }

    async fn nearest_chunks(
        &self,
        user: UserId,
        vector: &[f32],
        top_n: usize,
    ) -> Result<Vec<ChunkHit>, StoreError> {
        let users = self.read()?;
        let Some(space) = users.get(&user) else {
            return Ok(Vec::new());
        };
        let scored: Vec<(f32, &ChunkRecord)> = space
            .chunks
            .values()
            .filter(|chunk| space.documents.contains_key(&chunk.document_id))
            .map(|chunk| (dot(&chunk.embedding, vector), chunk))
            .collect();
        Ok(top_by_score(scored, top_n)
            .into_iter()
            .map(|(score, chunk)| ChunkHit {
                document_id: chunk.document_id,
                url: chunk.url.clone(),
                title: chunk.title.clone(),
                position: chunk.position,
                text: chunk.text.clone(),
                score,
            })
            .collect())
    }

    async fn recent_documents(
        &self,
        user: UserId,
        before: Option<DocumentId>,
        limit: usize,
    ) -> Result<Vec<DocumentSummary>, StoreError> {
        let users = self.read()?;
        let Some(space) = users.get(&user) else {
            return Ok(Vec::new());
        };
        let mut docs: Vec<DocumentSummary> = space
            .documents
            .values()
            .filter(|doc| before.map_or(true, |cursor| doc.id < cursor))
            .map(DocumentRecord::summary)
            .collect();
        docs.sort_by(|a, b| b.id.cmp(&a.id));
        docs.truncate(limit);
        Ok(docs)
    }

    async fn load_document(
        &self,
        user: UserId,
        id: DocumentId,
    ) -> Result<Option<DocumentRecord>, StoreError> {
        let users = self.read()?;
        Ok(users
            .get(&user)
            .and_then(|space| space.documents.get(&id))
            .cloned())
    }
}
