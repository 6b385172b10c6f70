use std::sync::Arc;

use chunk::{ChunkConfig, Chunker};
use embed::StubEmbedder;
use fingerprint::{FingerprintConfig, Fingerprinter, PermutationSet};
use ingest::{IngestConfig, Ingestor, RawSaveRequest, SaveOutcome};
use store::{InMemoryStore, UserId};

const PAGE: &str = "Lighthouses guided ships along dangerous coasts for centuries. \
    Keepers trimmed wicks and wound clockwork every few hours. \
    Automation ended the profession in most countries by the late twentieth century.";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let fp_cfg = FingerprintConfig::default();
    let perms = Arc::new(PermutationSet::generate_with_seed(fp_cfg.num_minhashes, 1));
    let fingerprinter = match Fingerprinter::new(fp_cfg, perms) {
        Ok(f) => Arc::new(f),
        Err(err) => return eprintln!("fingerprinter: {err}"),
    };
    let chunker = match Chunker::new(ChunkConfig::default().with_max_tokens(16)) {
        Ok(c) => Arc::new(c),
        Err(err) => return eprintln!("chunker: {err}"),
    };
    let ingestor = match Ingestor::new(
        fingerprinter,
        chunker,
        Arc::new(StubEmbedder::new(128)),
        Arc::new(InMemoryStore::new()),
        IngestConfig::default(),
    ) {
        Ok(i) => i,
        Err(err) => return eprintln!("ingestor: {err}"),
    };

    let user = UserId::new();
    for attempt in 1..=2 {
        let request = RawSaveRequest::new("https://example.com/lighthouses", "Lighthouses", PAGE, user);
        match ingestor.save(request).await {
            Ok(SaveOutcome::Saved { document_id, chunks }) => {
                println!("attempt {attempt}: saved {document_id} with {chunks} chunks")
            }
            Ok(SaveOutcome::Skipped { nearest, similarity }) => {
                println!("attempt {attempt}: duplicate of {nearest} (similarity {similarity:.3})")
            }
            Err(err) => eprintln!("attempt {attempt}: {err} (stage {})", err.stage()),
        }
    }
}
