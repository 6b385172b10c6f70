use metrics::counter;
use store::{ChunkRecord, DocumentStore, StoreError};
use tracing::warn;

use crate::config::BackoffPolicy;

/// Write `chunks`, resubmitting only the failed subset after each backoff
/// wait. Fails with the last write error once the policy's waits run out.
pub async fn write_chunks_with_retry(
    store: &dyn DocumentStore,
    chunks: Vec<ChunkRecord>,
    concurrency: usize,
    backoff: &BackoffPolicy,
) -> Result<(), StoreError> {
    let mut pending = chunks;
    let mut delays = backoff.delays();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let results = store.upsert_chunks(&pending, concurrency).await;

        let mut failed = Vec::new();
        let mut last_error = None;
        for (chunk, result) in pending.into_iter().zip(results) {
            if let Err(err) = result {
                failed.push(chunk);
                last_error = Some(err);
            }
        }

        let Some(last_error) = last_error else {
            return Ok(());
        };

        let Some(delay) = delays.next() else {
            warn!(
                attempt,
                failed = failed.len(),
                error = %last_error,
                "chunk_write_exhausted"
            );
            return Err(last_error);
        };

        warn!(
            attempt,
            failed = failed.len(),
            delay_ms = delay.as_millis() as u64,
            error = %last_error,
            "chunk_write_retry"
        );
        counter!("recall_chunk_write_retries_total").increment(1);
        tokio::time::sleep(delay).await;
        pending = failed;
    }
}
