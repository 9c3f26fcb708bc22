use std::sync::Arc;

use docqa_core::traits::{Embedder, Retriever};
use docqa_core::types::{Chunk, DocumentSet};
use docqa_core::Availability;
use docqa_embed::FakeEmbedder;
use docqa_hybrid::{retriever_from_indexes, select_retriever, HybridRetriever, RetrieverKind, LEXICAL_WEIGHT, VECTOR_WEIGHT_ALONE, VECTOR_WEIGHT_SHARED};
use docqa_text::LexicalIndex;
use docqa_vector::VectorIndex;

fn chunk(id: usize) -> Chunk { Chunk { content: format!("chunk {id}"), source: "doc.txt".into(), chunk_id: id } }

/// Returns a fixed ranking regardless of the query.
struct Fixed { name: &'static str, ids: Vec<usize> }

impl Retriever for Fixed {
    fn retrieve(&self, _query: &str, k: usize) -> anyhow::Result<Vec<Chunk>> { Ok(self.ids.iter().take(k).map(|&i| chunk(i)).collect()) }
    fn name(&self) -> &str { self.name }
}

struct Broken;

impl Retriever for Broken {
    fn retrieve(&self, _query: &str, _k: usize) -> anyhow::Result<Vec<Chunk>> { anyhow::bail!("index gone") }
    fn name(&self) -> &str { "broken" }
}

fn fixed(name: &'static str, ids: &[usize]) -> Arc<dyn Retriever> { Arc::new(Fixed { name, ids: ids.to_vec() }) }

fn ids(chunks: &[Chunk]) -> Vec<usize> { chunks.iter().map(|c| c.chunk_id).collect() }

#[test]
fn fusion_dedups_and_breaks_ties_by_first_appearance() {
    let h = HybridRetriever::new(vec![(fixed("lexical", &[0, 1, 2]), 0.5), (fixed("vector", &[2, 3, 0]), 0.5)]).unwrap();
    let out = h.retrieve("q", 5).unwrap();
    // 0 and 2 share 0.5/61 + 0.5/63; 1 and 3 share 0.5/62
    assert_eq!(ids(&out), vec![0, 2, 1, 3]);
}

#[test]
fn fusion_truncates_to_k() {
    let h = HybridRetriever::new(vec![(fixed("lexical", &[0, 1, 2]), 0.5), (fixed("vector", &[2, 3, 0]), 0.5)]).unwrap();
    assert_eq!(ids(&h.retrieve("q", 2).unwrap()), vec![0, 2]);
}

#[test]
fn heavier_weight_wins_disagreement() {
    let h = HybridRetriever::new(vec![(fixed("lexical", &[1, 2]), 0.2), (fixed("vector", &[2, 1]), 0.8)]).unwrap();
    assert_eq!(ids(&h.retrieve("q", 5).unwrap()), vec![2, 1]);
}

#[test]
fn failing_member_is_skipped() {
    let h = HybridRetriever::new(vec![(Arc::new(Broken) as Arc<dyn Retriever>, 0.5), (fixed("vector", &[4, 3]), 0.5)]).unwrap();
    assert_eq!(ids(&h.retrieve("q", 5).unwrap()), vec![4, 3]);

    let all_broken = HybridRetriever::new(vec![(Arc::new(Broken) as Arc<dyn Retriever>, 0.5), (Arc::new(Broken) as Arc<dyn Retriever>, 0.5)]).unwrap();
    assert!(all_broken.retrieve("q", 5).is_err());
}

#[test]
fn ensemble_rejects_bad_weights() {
    assert!(HybridRetriever::new(vec![(fixed("a", &[0]), f32::NAN), (fixed("b", &[1]), 0.5)]).is_err());
    assert!(HybridRetriever::new(vec![(fixed("a", &[0]), 0.0), (fixed("b", &[1]), 0.0)]).is_err());
    assert!(HybridRetriever::new(vec![(fixed("a", &[0]), 1.0)]).is_err());
}

#[test]
fn selection_follows_available_members() {
    assert!(select_retriever(None, None).is_none());

    let lexical_only = select_retriever(Some(fixed("lexical", &[3, 1, 2])), None).unwrap();
    assert_eq!(lexical_only.kind, RetrieverKind::Lexical);
    assert_eq!(ids(&lexical_only.retriever.retrieve("q", 5).unwrap()), vec![3, 1, 2]);

    let vector_only = select_retriever(None, Some(fixed("vector", &[2]))).unwrap();
    assert_eq!(vector_only.kind, RetrieverKind::Vector);

    let both = select_retriever(Some(fixed("lexical", &[0])), Some(fixed("vector", &[1]))).unwrap();
    assert_eq!(both.kind, RetrieverKind::Hybrid);
    assert_eq!(both.retriever.name(), "hybrid");
    assert_eq!((LEXICAL_WEIGHT, VECTOR_WEIGHT_SHARED), (0.5, 0.5));
    assert_eq!(VECTOR_WEIGHT_ALONE, 0.7);
}

fn corpus() -> Arc<DocumentSet> {
    let texts = ["Water boils at 100 degrees Celsius.", "Fire needs oxygen and fuel.", "Bread is baked in an oven."];
    Arc::new(DocumentSet::new(
        texts.iter().enumerate().map(|(i, t)| Chunk { content: t.to_string(), source: "notes.txt".into(), chunk_id: i }).collect(),
    ))
}

#[test]
fn indexes_feed_selection() {
    let docs = corpus();
    let embedder: Arc<dyn Embedder> = Arc::new(FakeEmbedder::default());

    let both = retriever_from_indexes(LexicalIndex::try_build(Arc::clone(&docs)), VectorIndex::try_build(Arc::clone(&docs), Some(embedder))).unwrap();
    assert_eq!(both.kind, RetrieverKind::Hybrid);
    let top = both.retriever.retrieve("water boils", 5).unwrap();
    assert_eq!(top[0].chunk_id, 0);

    let lexical = retriever_from_indexes(LexicalIndex::try_build(Arc::clone(&docs)), Availability::unavailable("no embeddings")).unwrap();
    assert_eq!(lexical.kind, RetrieverKind::Lexical);

    assert!(retriever_from_indexes(Availability::unavailable("empty"), Availability::unavailable("empty")).is_none());
}
