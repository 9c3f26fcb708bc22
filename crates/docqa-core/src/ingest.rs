use std::path::Path;

use tracing::info;

use crate::chunker::Chunker;
use crate::loader::DocumentLoader;
use crate::types::DocumentSet;

/// Load and chunk `file_paths` into one [`DocumentSet`].
///
/// Files that fail to load are skipped; the result is empty when nothing
/// could be read.
pub fn load_and_chunk<P: AsRef<Path>>(
    loader: &DocumentLoader,
    chunker: &Chunker,
    file_paths: &[P],
) -> DocumentSet {
    if file_paths.is_empty() {
        return DocumentSet::default();
    }
    let units = loader.load_all(file_paths);
    let docs = chunker.chunk_units(&units);
    info!(files = file_paths.len(), units = units.len(), chunks = docs.len(), "documents chunked");
    docs
}
