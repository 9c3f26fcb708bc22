//! docqa-text
//!
//! Tantivy-based lexical (BM25) retrieval over a run's chunks, held entirely in
//! memory and discarded with the run.
pub mod tantivy_utils;
pub mod index;

pub use index::LexicalIndex;
