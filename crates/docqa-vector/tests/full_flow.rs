use std::sync::Arc;

use docqa_core::error::Error;
use docqa_core::traits::{Embedder, Retriever};
use docqa_core::types::{Chunk, DocumentSet};
use docqa_embed::FakeEmbedder;
use docqa_vector::VectorIndex;

/// Two-dimensional embedding counting 'a' and 'b' characters, then normalized.
struct CountAbEmbedder;

impl Embedder for CountAbEmbedder {
    fn dim(&self) -> usize { 2 }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let a = t.chars().filter(|&c| c == 'a').count() as f32;
                let b = t.chars().filter(|&c| c == 'b').count() as f32;
                let n = (a * a + b * b).sqrt().max(1e-6);
                vec![a / n, b / n]
            })
            .collect())
    }
}

struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn dim(&self) -> usize { 2 }
    fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        anyhow::bail!("model offline")
    }
}

/// Drops the last vector so the count no longer matches the chunks.
struct ShortEmbedder;

impl Embedder for ShortEmbedder {
    fn dim(&self) -> usize { 2 }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect())
    }
}

fn docs(texts: &[&str]) -> Arc<DocumentSet> {
    Arc::new(DocumentSet::new(
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk { content: t.to_string(), source: "ab.txt".to_string(), chunk_id: i })
            .collect(),
    ))
}

#[test]
fn nearest_chunks_come_first() {
    let index = VectorIndex::build(docs(&["aaaa", "bbbb", "aab"]), Arc::new(CountAbEmbedder)).expect("index");
    assert_eq!(index.len(), 3);
    assert_eq!(index.dim(), 2);

    let chunks = index.retrieve("aaaaaa", 3).expect("retrieve");
    let order: Vec<usize> = chunks.iter().map(|c| c.chunk_id).collect();
    assert_eq!(order, vec![0, 2, 1]);

    assert_eq!(index.retrieve("b", 1).expect("retrieve")[0].chunk_id, 1);
}

#[test]
fn ties_break_by_chunk_order() {
    let index = VectorIndex::build(docs(&["ab", "ba", "ab"]), Arc::new(CountAbEmbedder)).expect("index");
    let hits = index.search("ab", 3).expect("search");
    let order: Vec<usize> = hits.iter().map(|h| h.ordinal).collect();
    assert_eq!(order, vec![0, 1, 2]);
}

#[test]
fn fake_embedder_finds_exact_text() {
    let set = docs(&["rust ownership and borrowing", "python garbage collection", "tantivy bm25 scoring"]);
    let index = VectorIndex::build(set, Arc::new(FakeEmbedder::default())).expect("index");
    let top = index.retrieve("python garbage collection", 1).expect("retrieve");
    assert_eq!(top[0].chunk_id, 1);
}

#[test]
fn build_failures_are_unavailable() {
    assert!(!VectorIndex::try_build(docs(&["aaa"]), None).is_ready());
    assert!(!VectorIndex::try_build(docs(&["aaa"]), Some(Arc::new(FailingEmbedder))).is_ready());
    assert!(!VectorIndex::try_build(docs(&["aaa", "bbb"]), Some(Arc::new(ShortEmbedder))).is_ready());
    assert!(!VectorIndex::try_build(Arc::new(DocumentSet::default()), Some(Arc::new(CountAbEmbedder))).is_ready());
}

#[test]
fn shape_problems_are_index_errors() {
    let short = VectorIndex::build(docs(&["aaa", "bbb"]), Arc::new(ShortEmbedder)).err().expect("count mismatch");
    assert!(matches!(short.downcast_ref::<Error>(), Some(Error::Index(_))));

    let empty = VectorIndex::build(Arc::new(DocumentSet::default()), Arc::new(CountAbEmbedder)).err().expect("empty set");
    assert!(matches!(empty.downcast_ref::<Error>(), Some(Error::Index(_))));
}
