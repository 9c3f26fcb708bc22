//! docqa-vector
//!
//! Dense retrieval: every chunk is embedded once per run and queries are
//! answered by exhaustive dot-product search over unit vectors.

pub mod index;
pub mod similarity;

pub use index::VectorIndex;
