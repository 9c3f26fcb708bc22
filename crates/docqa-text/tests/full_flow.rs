use std::sync::Arc;

use docqa_core::error::Error;
use docqa_core::traits::Retriever;
use docqa_core::types::{Chunk, DocumentSet};
use docqa_text::LexicalIndex;

fn docs(texts: &[&str]) -> Arc<DocumentSet> {
    Arc::new(DocumentSet::new(
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk { content: t.to_string(), source: format!("doc{i}.txt"), chunk_id: i })
            .collect(),
    ))
}

#[test]
fn ranks_chunks_by_term_statistics() {
    let index = LexicalIndex::build(docs(&[
        "Firecraft basics: building a fire with flint and steel.",
        "Computer networking uses routers and switches.",
        "Fire safety: keep water near any fire, fire spreads quickly.",
    ]))
    .expect("index");

    let hits = index.search("fire", 10).expect("search");
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].ordinal, 2, "chunk with the most occurrences ranks first");
    assert!(hits[0].score >= hits[1].score && hits[1].score > 0.0);
    assert_eq!((hits[2].ordinal, hits[2].score), (1, 0.0));

    let chunks = index.retrieve("routers", 5).expect("retrieve");
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].source, "doc1.txt");
}

#[test]
fn k_limits_results() {
    let index = LexicalIndex::build(docs(&["apple one", "apple two", "apple three", "pear"])).expect("index");
    assert_eq!(index.retrieve("apple", 2).expect("retrieve").len(), 2);
    assert!(index.retrieve("apple", 0).expect("retrieve").is_empty());
}

#[test]
fn query_syntax_characters_do_not_fail() {
    let index = LexicalIndex::build(docs(&["What is the boiling point of water?"])).expect("index");
    let chunks = index.retrieve("boiling point (of: water?", 5).expect("lenient parse");
    assert_eq!(chunks.len(), 1);
}

#[test]
fn empty_document_set_is_unavailable() {
    let built = LexicalIndex::try_build(Arc::new(DocumentSet::default()));
    assert!(!built.is_ready());
    assert!(built.reason().is_some());
}

#[test]
fn unmatched_query_still_returns_chunks_in_order() {
    let index = LexicalIndex::build(docs(&[
        "Volcanoes erupt molten lava near the coast.",
        "Glaciers carve valleys.",
        "Basalt is volcanic rock.",
    ]))
    .expect("index");

    let hits = index.search("Summarize this document", 2).expect("search");
    let ordinals: Vec<usize> = hits.iter().map(|h| h.ordinal).collect();
    assert_eq!(ordinals, vec![0, 1]);
    assert!(hits.iter().all(|h| h.score == 0.0));

    assert_eq!(index.retrieve("zzz", 10).expect("retrieve").len(), 3);
}

#[test]
fn common_words_are_searchable() {
    let index = LexicalIndex::build(docs(&["to be or not to be", "something else entirely"])).expect("index");
    let hits = index.search("be", 1).expect("search");
    assert_eq!(hits[0].ordinal, 0);
    assert!(hits[0].score > 0.0);
}

#[test]
fn empty_set_is_an_index_error() {
    let err = LexicalIndex::build(Arc::new(DocumentSet::default())).err().expect("empty set");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Index(_))));
}
