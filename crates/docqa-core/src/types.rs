//! Domain types shared by the loader, the indexes and the answer pipeline.

use serde::{Deserialize, Serialize};

/// Ordinal of a chunk inside a single pipeline run.
pub type ChunkId = usize;

/// Placeholder used when a chunk's originating file name cannot be derived.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// A raw unit of text read from one file, before chunking.
///
/// Plain-text files produce one unit; PDFs produce one unit per page when
/// page breaks are present in the extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    pub text: String,
    pub source: String,
}

/// A passage of a source document that is independently indexed.
///
/// - `content`: the text payload of the chunk
/// - `source`: base name of the originating file (or [`UNKNOWN_SOURCE`])
/// - `chunk_id`: creation order across the whole run, never reset per file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub source: String,
    pub chunk_id: ChunkId,
}

impl Chunk {
    pub fn has_known_source(&self) -> bool {
        self.source != UNKNOWN_SOURCE
    }
}

/// Ordered chunks produced for one run. Empty is a valid state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet {
    chunks: Vec<Chunk>,
}

impl DocumentSet {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self { chunks }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn get(&self, ordinal: usize) -> Option<&Chunk> {
        self.chunks.get(ordinal)
    }

    /// The first `n` chunks in `chunk_id` order.
    pub fn head(&self, n: usize) -> &[Chunk] {
        &self.chunks[..n.min(self.chunks.len())]
    }

    pub fn contents(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.content.clone()).collect()
    }
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Vector,
    Text,
}

/// The minimal surface returned by all retrievers.
///
/// `ordinal` indexes into the run's [`DocumentSet`]. `score` is
/// engine-specific but higher is always better. `source` labels the origin
/// engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub ordinal: usize,
    pub score: f32,
    pub source: SourceKind,
}

/// Fixed response shape every language-model implementation must produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub text: String,
}

impl ModelResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
