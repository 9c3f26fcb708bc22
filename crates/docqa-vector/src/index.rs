use std::cmp::Ordering;
use std::sync::Arc;

use anyhow::{anyhow, ensure, Context, Result};
use tracing::{debug, warn};

use docqa_core::error::Error;
use docqa_core::traits::{Embedder, Retriever};
use docqa_core::types::{Chunk, DocumentSet, SearchHit, SourceKind};
use docqa_core::Availability;

use crate::similarity::{dot, is_unit, l2_norm};

const UNIT_TOLERANCE: f32 = 1e-3;

/// Flat nearest-neighbour index over one run's chunk embeddings.
///
/// Row `i` of `vectors` is the embedding of chunk `i` of the document set.
pub struct VectorIndex {
    embedder: Arc<dyn Embedder>,
    vectors: Vec<Vec<f32>>,
    docs: Arc<DocumentSet>,
}

impl VectorIndex {
    pub fn build(docs: Arc<DocumentSet>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        ensure!(!docs.is_empty(), Error::Index("no chunks to embed".into()));
        let vectors = embedder.embed_batch(&docs.contents()).context("embedding chunks")?;
        ensure!(
            vectors.len() == docs.len(),
            Error::Index(format!("embedder returned {} vectors for {} chunks", vectors.len(), docs.len()))
        );
        let dim = vectors[0].len();
        ensure!(dim > 0, Error::Index("embedder returned empty vectors".into()));
        for (i, v) in vectors.iter().enumerate() {
            ensure!(v.len() == dim, Error::Index(format!("vector {} has {} dims, expected {}", i, v.len(), dim)));
        }
        let not_unit = vectors.iter().filter(|v| !is_unit(v, UNIT_TOLERANCE)).count();
        if not_unit > 0 {
            warn!(not_unit, "embeddings are not unit length; scores are raw dot products");
        }
        debug!(chunks = docs.len(), dim, "vector index built");
        Ok(Self { embedder, vectors, docs })
    }

    /// Build with an optional embedder, reporting every failure as an
    /// unavailable stage.
    pub fn try_build(docs: Arc<DocumentSet>, embedder: Option<Arc<dyn Embedder>>) -> Availability<Self> {
        match embedder {
            None => Availability::unavailable("no embedding function configured"),
            Some(embedder) => Availability::from_result("vector_index", Self::build(docs, embedder)),
        }
    }

    pub fn dim(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        ensure!(
            query_vec.len() == self.dim(),
            "query embedding has {} dims, index has {}",
            query_vec.len(),
            self.dim()
        );
        if l2_norm(query_vec) == 0.0 {
            return Err(anyhow!("query embedding norm is zero"));
        }
        let mut hits: Vec<SearchHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(ordinal, v)| SearchHit { ordinal, score: dot(query_vec, v), source: SourceKind::Vector })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.ordinal.cmp(&b.ordinal))
        });
        hits.truncate(k);
        Ok(hits)
    }

    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let q_vec = self.embedder.embed(query).context("embedding query")?;
        self.search_vec(&q_vec, k)
    }
}

impl Retriever for VectorIndex {
    fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Chunk>> {
        self.search(query, k)?
            .into_iter()
            .map(|h| {
                self.docs
                    .get(h.ordinal)
                    .cloned()
                    .ok_or_else(|| anyhow!("hit ordinal {} out of range", h.ordinal))
            })
            .collect()
    }

    fn name(&self) -> &str {
        "vector"
    }
}
