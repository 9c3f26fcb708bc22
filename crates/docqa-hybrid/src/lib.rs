//! docqa-hybrid
//!
//! Chooses the retriever for a run from whichever indexes were built, and
//! fuses lexical and vector rankings with weighted reciprocal rank fusion when
//! both are present.

use anyhow::{bail, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use docqa_core::traits::Retriever;
use docqa_core::types::{Chunk, ChunkId};
use docqa_core::Availability;
use docqa_text::LexicalIndex;
use docqa_vector::VectorIndex;

pub const LEXICAL_WEIGHT: f32 = 0.5;
/// Weight of the vector retriever when it is the only one present.
pub const VECTOR_WEIGHT_ALONE: f32 = 0.7;
/// Weight of the vector retriever when it joins the lexical one.
pub const VECTOR_WEIGHT_SHARED: f32 = 0.5;
/// Rank offset in `weight / (rank + c)`.
pub const RRF_C: f32 = 60.0;

pub struct HybridRetriever {
    members: Vec<(Arc<dyn Retriever>, f32)>,
    c: f32,
}

impl HybridRetriever {
    pub fn new(members: Vec<(Arc<dyn Retriever>, f32)>) -> Result<Self> {
        if members.len() < 2 { bail!("an ensemble needs at least two retrievers, got {}", members.len()); }
        if let Some((r, w)) = members.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            bail!("invalid weight {} for retriever '{}'", w, r.name());
        }
        if members.iter().map(|(_, w)| w).sum::<f32>() <= 0.0 { bail!("ensemble weights sum to zero"); }
        Ok(Self { members, c: RRF_C })
    }

    pub fn weights(&self) -> Vec<f32> { self.members.iter().map(|(_, w)| *w).collect() }

    /// `score(chunk) = Σ weight_i / (rank_i + c)` with 1-based ranks. Equal
    /// scores keep first-appearance order across the input lists.
    fn fuse(&self, lists: Vec<(f32, Vec<Chunk>)>) -> Vec<Chunk> {
        let mut fused: Vec<(Chunk, f32)> = Vec::new();
        let mut position: HashMap<ChunkId, usize> = HashMap::new();
        for (weight, chunks) in lists {
            for (idx, chunk) in chunks.into_iter().enumerate() {
                let contribution = weight / ((idx + 1) as f32 + self.c);
                match position.get(&chunk.chunk_id) {
                    Some(&at) => fused[at].1 += contribution,
                    None => { position.insert(chunk.chunk_id, fused.len()); fused.push((chunk, contribution)); }
                }
            }
        }
        fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        fused.into_iter().map(|(c, _)| c).collect()
    }
}

impl Retriever for HybridRetriever {
    fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Chunk>> {
        let mut lists = Vec::with_capacity(self.members.len());
        for (retriever, weight) in &self.members {
            match retriever.retrieve(query, k) {
                Ok(chunks) => { debug!(retriever = retriever.name(), hits = chunks.len(), "sub-retriever results"); lists.push((*weight, chunks)); }
                Err(e) => warn!(retriever = retriever.name(), error = %e, "sub-retriever failed"),
            }
        }
        if lists.is_empty() { bail!("All retrievers failed"); }
        let mut fused = self.fuse(lists);
        fused.truncate(k);
        Ok(fused)
    }

    fn name(&self) -> &str { "hybrid" }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrieverKind { Lexical, Vector, Hybrid }

impl fmt::Display for RetrieverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Self::Lexical => "lexical", Self::Vector => "vector", Self::Hybrid => "hybrid" })
    }
}

pub struct SelectedRetriever {
    pub kind: RetrieverKind,
    pub retriever: Arc<dyn Retriever>,
}

/// Pick the retriever for a run from the sub-retrievers that exist.
///
/// - none → `None`
/// - one → that retriever alone
/// - both → weighted ensemble; if the ensemble cannot be built, the first
///   sub-retriever (lexical) is used instead
pub fn select_retriever(lexical: Option<Arc<dyn Retriever>>, vector: Option<Arc<dyn Retriever>>) -> Option<SelectedRetriever> {
    let mut members: Vec<(RetrieverKind, Arc<dyn Retriever>, f32)> = Vec::new();
    if let Some(l) = lexical { members.push((RetrieverKind::Lexical, l, LEXICAL_WEIGHT)); }
    if let Some(v) = vector {
        // 0.7 only when vector is alone; an ensemble is always 0.5/0.5
        let weight = if members.is_empty() { VECTOR_WEIGHT_ALONE } else { VECTOR_WEIGHT_SHARED };
        members.push((RetrieverKind::Vector, v, weight));
    }

    match members.len() {
        0 => { info!("no retriever available"); None }
        1 => members.pop().map(|(kind, retriever, _)| { info!(%kind, "single retriever"); SelectedRetriever { kind, retriever } }),
        _ => {
            let first = SelectedRetriever { kind: members[0].0, retriever: Arc::clone(&members[0].1) };
            match HybridRetriever::new(members.into_iter().map(|(_, r, w)| (r, w)).collect()) {
                Ok(h) => { info!(weights = ?h.weights(), "hybrid retriever"); Some(SelectedRetriever { kind: RetrieverKind::Hybrid, retriever: Arc::new(h) }) }
                Err(e) => { warn!(error = %e, fallback = %first.kind, "Could not create ensemble retriever"); Some(first) }
            }
        }
    }
}

/// [`select_retriever`] over the run's index outcomes.
pub fn retriever_from_indexes(lexical: Availability<LexicalIndex>, vector: Availability<VectorIndex>) -> Option<SelectedRetriever> {
    let lexical = lexical.into_option().map(|l| Arc::new(l) as Arc<dyn Retriever>);
    let vector = vector.into_option().map(|v| Arc::new(v) as Arc<dyn Retriever>);
    select_retriever(lexical, vector)
}
