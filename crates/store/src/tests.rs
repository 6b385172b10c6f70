use super::*;
use chrono::{DateTime, Utc};
use tempfile::TempDir;
use uuid::{NoContext, Timestamp, Uuid};

fn unit(dim: usize, hot: usize) -> Vec<f32> {
    let mut v = vec![0.0; dim];
    v[hot % dim] = 1.0;
    v
}

fn doc(user: UserId, id: DocumentId, fingerprint: Vec<f32>, saved_at: DateTime<Utc>) -> DocumentRecord {
    DocumentRecord {
        user,
        id,
        url: format!("https://example.com/{id}"),
        title: format!("doc {id}"),
        text: "body".into(),
        fingerprint,
        chunk_count: 0,
        saved_at,
    }
}

fn chunk(user: UserId, document_id: DocumentId, position: u32, embedding: Vec<f32>) -> ChunkRecord {
    ChunkRecord {
        user,
        document_id,
        position,
        url: format!("https://example.com/{document_id}"),
        title: "title".into(),
        text: format!("chunk {position}"),
        embedding,
    }
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
}

async fn nearest_fingerprint_is_user_scoped(store: &dyn DocumentStore) {
    let alice = UserId::new();
    let bob = UserId::new();
    let id = DocumentId::new();
    store.upsert_document(doc(alice, id, unit(8, 2), at(0))).await.unwrap();

    let hit = store.nearest_fingerprint(alice, &unit(8, 2)).await.unwrap().unwrap();
    assert_eq!(hit.document_id, id);
    assert!((hit.score - 1.0).abs() < 1e-6);
    assert_eq!(hit.fingerprint, unit(8, 2));

    assert!(store.nearest_fingerprint(bob, &unit(8, 2)).await.unwrap().is_none());
}

async fn nearest_fingerprint_picks_highest_dot(store: &dyn DocumentStore) {
    let user = UserId::new();
    let near = DocumentId::new();
    let far = DocumentId::new();
    store.upsert_document(doc(user, far, unit(4, 0), at(0))).await.unwrap();
    store
        .upsert_document(doc(user, near, vec![0.6, 0.8, 0.0, 0.0], at(1)))
        .await
        .unwrap();

    let hit = store.nearest_fingerprint(user, &unit(4, 1)).await.unwrap().unwrap();
    assert_eq!(hit.document_id, near);
}

async fn chunks_hidden_until_document_written(store: &dyn DocumentStore) {
    let user = UserId::new();
    let id = DocumentId::new();
    let results = store
        .upsert_chunks(&[chunk(user, id, 0, unit(4, 0)), chunk(user, id, 1, unit(4, 1))], 16)
        .await;
    assert!(results.iter().all(|r| r.is_ok()));

    assert!(store.nearest_chunks(user, &unit(4, 0), 10).await.unwrap().is_empty());

    store.upsert_document(doc(user, id, unit(4, 0), at(0))).await.unwrap();
    let hits = store.nearest_chunks(user, &unit(4, 0), 10).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].position, 0);
    assert!((hits[0].score - 1.0).abs() < 1e-6);
}

async fn nearest_chunks_ordered_and_truncated(store: &dyn DocumentStore) {
    let user = UserId::new();
    let id = DocumentId::new();
    store.upsert_document(doc(user, id, unit(4, 0), at(0))).await.unwrap();
    let query = vec![1.0, 0.0, 0.0, 0.0];
    let embeddings = [
        vec![0.2, 0.98, 0.0, 0.0],
        vec![0.9, 0.43, 0.0, 0.0],
        vec![0.5, 0.86, 0.0, 0.0],
    ];
    for (pos, e) in embeddings.iter().enumerate() {
        store.upsert_chunk(chunk(user, id, pos as u32, e.clone())).await.unwrap();
    }

    let hits = store.nearest_chunks(user, &query, 2).await.unwrap();
    assert_eq!(hits.iter().map(|h| h.position).collect::<Vec<_>>(), vec![1, 2]);
    assert!(hits[0].score >= hits[1].score);
}

async fn delete_chunks_removes_only_that_document(store: &dyn DocumentStore) {
    let user = UserId::new();
    let keep = DocumentId::new();
    let dropped = DocumentId::new();
    for d in [keep, dropped] {
        store.upsert_document(doc(user, d, unit(4, 0), at(0))).await.unwrap();
        for pos in 0..3 {
            store.upsert_chunk(chunk(user, d, pos, unit(4, 0))).await.unwrap();
        }
    }

    assert_eq!(store.delete_chunks(user, dropped).await.unwrap(), 3);
    assert_eq!(store.delete_chunks(user, dropped).await.unwrap(), 0);

    let hits = store.nearest_chunks(user, &unit(4, 0), 10).await.unwrap();
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().all(|h| h.document_id == keep));
}

async fn recent_documents_paginate_newest_first(store: &dyn DocumentStore) {
    let user = UserId::new();
    let mut ids: Vec<DocumentId> = (0..5).map(|_| DocumentId::new()).collect();
    ids.sort();
    for (i, id) in ids.iter().enumerate() {
        store
            .upsert_document(doc(user, *id, unit(4, 0), at(i as i64 * 10)))
            .await
            .unwrap();
    }

    let first = store.recent_documents(user, None, 2).await.unwrap();
    assert_eq!(first.iter().map(|d| d.id).collect::<Vec<_>>(), vec![ids[4], ids[3]]);

    let cursor = first.last().map(|d| d.id);
    let second = store.recent_documents(user, cursor, 10).await.unwrap();
    assert_eq!(
        second.iter().map(|d| d.id).collect::<Vec<_>>(),
        vec![ids[2], ids[1], ids[0]]
    );
}

async fn same_millisecond_saves_page_without_gaps(store: &dyn DocumentStore) {
    let user = UserId::new();
    let mut ids: Vec<DocumentId> = (0..3)
        .map(|_| DocumentId(Uuid::new_v7(Timestamp::from_unix(NoContext, 1_700_000_000, 0))))
        .collect();
    ids.sort();
    for id in &ids {
        store.upsert_document(doc(user, *id, unit(4, 0), at(0))).await.unwrap();
    }
    assert!(ids.iter().all(|id| id.saved_at() == ids[0].saved_at()));

    let mut seen = Vec::new();
    let mut cursor = None;
    loop {
        let page = store.recent_documents(user, cursor, 1).await.unwrap();
        let Some(last) = page.last() else { break };
        cursor = Some(last.id);
        seen.extend(page.iter().map(|d| d.id));
    }
    assert_eq!(seen, vec![ids[2], ids[1], ids[0]]);
}

async fn load_document_round_trip(store: &dyn DocumentStore) {
    let user = UserId::new();
    let id = DocumentId::new();
    let record = doc(user, id, vec![0.5, 0.5, 0.5, 0.5], at(3));
    store.upsert_document(record.clone()).await.unwrap();

    assert_eq!(store.load_document(user, id).await.unwrap(), Some(record));
    assert_eq!(store.load_document(UserId::new(), id).await.unwrap(), None);
}

async fn bulk_results_align_with_inputs(store: &dyn DocumentStore) {
    let user = UserId::new();
    let id = DocumentId::new();
    let chunks: Vec<ChunkRecord> = (0..40).map(|p| chunk(user, id, p, unit(4, p as usize))).collect();
    let results = store.upsert_chunks(&chunks, 4).await;
    assert_eq!(results.len(), 40);
    assert!(results.iter().all(|r| r.is_ok()));
}

async fn run_suite(store: &dyn DocumentStore) {
    nearest_fingerprint_is_user_scoped(store).await;
    nearest_fingerprint_picks_highest_dot(store).await;
    chunks_hidden_until_document_written(store).await;
    nearest_chunks_ordered_and_truncated(store).await;
    delete_chunks_removes_only_that_document(store).await;
    recent_documents_paginate_newest_first(store).await;
    same_millisecond_saves_page_without_gaps(store).await;
    load_document_round_trip(store).await;
    bulk_results_align_with_inputs(store).await;
}

#[tokio::test]
async fn in_memory_store_contract() {
    let store = InMemoryStore::new();
    run_suite(&store).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn redb_store_contract() {
    let dir = TempDir::new().unwrap();
    let store = RedbStore::open(dir.path().join("recall.redb")).unwrap();
    run_suite(&store).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn redb_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("recall.redb");
    let user = UserId::new();
    let id = DocumentId::new();
    {
        let store = RedbStore::open(&path).unwrap();
        store.upsert_document(doc(user, id, unit(4, 1), at(0))).await.unwrap();
        store.upsert_chunk(chunk(user, id, 0, unit(4, 1))).await.unwrap();
    }
    let store = RedbStore::open(&path).unwrap();
    assert!(store.load_document(user, id).await.unwrap().is_some());
    assert_eq!(store.nearest_chunks(user, &unit(4, 1), 5).await.unwrap().len(), 1);
}

#[tokio::test]
async fn in_memory_counts_include_invisible_chunks() {
    let store = InMemoryStore::new();
    let user = UserId::new();
    store.upsert_chunk(chunk(user, DocumentId::new(), 0, unit(4, 0))).await.unwrap();
    assert_eq!(store.chunk_count(user), 1);
    assert_eq!(store.document_count(user), 0);
}

#[test]
fn store_config_builds_in_memory_by_default() {
    assert_eq!(StoreConfig::default(), StoreConfig::in_memory());
    assert!(StoreConfig::default().build().is_ok());
}

#[test]
fn top_by_score_is_stable_for_ties() {
    let ranked = top_by_score(vec![(0.5, 'a'), (0.9, 'b'), (0.5, 'c'), (0.5, 'd')], 3);
    assert_eq!(ranked.iter().map(|(_, c)| *c).collect::<Vec<_>>(), vec!['b', 'a', 'c']);
}
