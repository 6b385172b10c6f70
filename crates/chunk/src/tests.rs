use super::*;

fn chunker(max_tokens: usize) -> Chunker {
    Chunker::new(ChunkConfig::new().with_max_tokens(max_tokens)).unwrap()
}

/// `words`-word sentence whose first word is capitalized so UAX #29 breaks
/// before it.
fn sentence(label: &str, words: usize) -> String {
    let mut body: Vec<String> = (0..words).map(|i| format!("{label}{i}")).collect();
    if let Some(first) = body.first_mut() {
        *first = first.to_uppercase();
    }
    format!("{}.", body.join(" "))
}

// ==================== Sentence Splitting Tests ====================

#[test]
fn split_sentences_trims_and_drops_blanks() {
    let sentences = split_sentences("First one.  Second one?   Third!  ");
    assert_eq!(sentences, vec!["First one.", "Second one?", "Third!"]);
}

#[test]
fn normalize_whitespace_collapses_runs() {
    assert_eq!(normalize_whitespace("  a \n\t b   c "), "a b c");
}

// ==================== Grouping Tests ====================

#[test]
fn short_text_is_one_chunk() {
    let chunks = chunker(100).chunk_text("One sentence. Another sentence.");
    assert_eq!(chunks, vec!["One sentence. Another sentence."]);
}

#[test]
fn empty_text_yields_no_chunks() {
    assert!(chunker(10).chunk_text("").is_empty());
    assert!(chunker(10).chunk_text("   \n  ").is_empty());
}

#[test]
fn consecutive_chunks_overlap_by_one_sentence() {
    let a = sentence("a", 4);
    let b = sentence("b", 4);
    let c = sentence("c", 4);
    let d = sentence("d", 4);
    let text = format!("{a} {b} {c} {d}");

    let chunks = chunker(10).chunk_text(&text);

    assert_eq!(
        chunks,
        vec![
            format!("{a} {b}"),
            format!("{b} {c}"),
            format!("{c} {d}"),
        ]
    );
}

#[test]
fn carry_skipped_when_it_does_not_fit() {
    let a = sentence("a", 6);
    let b = sentence("b", 6);
    let chunks = chunker(10).chunk_text(&format!("{a} {b}"));
    assert_eq!(chunks, vec![a, b]);
}

#[test]
fn no_chunk_exceeds_budget() {
    let text: String = (0..40)
        .map(|i| sentence(&format!("s{i}x"), 1 + (i * 7) % 23))
        .collect::<Vec<_>>()
        .join(" ");
    let c = chunker(12);
    for chunk in c.chunk_text(&text) {
        assert!(
            c.count_tokens(&chunk) <= 12,
            "chunk over budget: {chunk}"
        );
    }
}

#[test]
fn every_sentence_is_covered() {
    let sentences: Vec<String> = (0..25).map(|i| sentence(&format!("t{i}_"), 1 + i % 6)).collect();
    let chunks = chunker(9).chunk_text(&sentences.join(" "));
    for s in &sentences {
        assert!(
            chunks.iter().any(|c| c.contains(s.as_str())),
            "sentence lost: {s}"
        );
    }
}

#[test]
fn oversize_sentence_is_bisected_on_words() {
    let long = sentence("w", 20);
    let c = chunker(6);
    let chunks = c.chunk_text(&long);

    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(c.count_tokens(chunk) <= 6);
    }
    let words: Vec<&str> = long.split_whitespace().collect();
    for word in words {
        assert!(chunks.iter().any(|chunk| chunk.split_whitespace().any(|w| w == word)));
    }
}

#[test]
fn unsplittable_word_is_dropped() {
    struct CharCounter;
    impl TokenCounter for CharCounter {
        fn count(&self, text: &str) -> usize {
            text.chars().filter(|c| !c.is_whitespace()).count()
        }
    }
    let c = Chunker::with_counter(ChunkConfig::new().with_max_tokens(5), Arc::new(CharCounter))
        .unwrap();

    let chunks = c.chunk_text("Ok. Enormousword. Fine.");

    assert_eq!(chunks, vec!["Ok.", "Fine."]);
}

#[test]
fn chunking_is_deterministic() {
    let text: String = (0..30).map(|i| sentence(&format!("d{i}"), 3 + i % 5)).collect::<Vec<_>>().join(" ");
    let c = chunker(11);
    assert_eq!(c.chunk_text(&text), c.chunk_text(&text));
}

// ==================== Title Chunk Tests ====================

#[test]
fn title_prepended_when_absent_from_body() {
    let doc = chunker(50).chunk_document("My  Title", "Body text here.\n\nMore body.");
    assert_eq!(doc.title, "My Title");
    assert_eq!(doc.text, "Body text here. More body.");
    assert_eq!(doc.chunks, vec!["My Title", "Body text here. More body."]);
    assert!(doc.has_title_chunk);
}

#[test]
fn title_not_repeated_when_body_contains_it() {
    let doc = chunker(50).chunk_document("Body text", "Body text here. More body.");
    assert!(!doc.has_title_chunk);
    assert_eq!(doc.chunks, vec!["Body text here. More body."]);
}

#[test]
fn title_match_uses_normalized_whitespace() {
    let doc = chunker(50).chunk_document("Body\n text", "Body    text here.");
    assert!(!doc.has_title_chunk);
}

#[test]
fn empty_title_adds_nothing() {
    let doc = chunker(50).chunk_document("  ", "Some body.");
    assert_eq!(doc.chunks, vec!["Some body."]);
}

#[test]
fn oversize_title_is_truncated_to_budget() {
    let title = (0..20).map(|i| format!("t{i}")).collect::<Vec<_>>().join(" ");
    let doc = chunker(6).chunk_document(&title, "Short body.");
    assert!(doc.has_title_chunk);
    assert_eq!(doc.chunks[0], "t0 t1 t2 t3 t4");
}

#[test]
fn title_chunk_can_be_disabled() {
    let c = Chunker::new(ChunkConfig::new().with_title_chunk(false)).unwrap();
    let doc = c.chunk_document("Other", "Body.");
    assert_eq!(doc.chunks, vec!["Body."]);
}

#[test]
fn invalid_config_rejected() {
    assert!(Chunker::new(ChunkConfig::new().with_max_tokens(0)).is_err());
}
