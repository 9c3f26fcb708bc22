//! Fixed user-facing strings and answer decoration.

use docqa_core::types::Chunk;

pub const MODEL_NOT_INITIALIZED: &str =
    "❌ Error: Language model not properly initialized. Please check your GOOGLE_API_KEY.";
pub const EMPTY_QUERY: &str = "Please provide a valid question.";

pub fn direct_error(e: impl std::fmt::Display) -> String {
    format!("❌ Error generating response: {e}")
}

pub fn fallback_error(e: impl std::fmt::Display) -> String {
    format!("❌ Error with fallback response: {e}")
}

pub fn rag_error(e: impl std::fmt::Display) -> String {
    format!("❌ Error in RAG pipeline: {e}")
}

/// Distinct source names in first-encountered order.
pub fn distinct_sources(chunks: &[Chunk]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for c in chunks {
        if !out.iter().any(|s| s == &c.source) {
            out.push(c.source.clone());
        }
    }
    out
}

/// `\n\n📚 *Sources: a, b*` over the chunks' distinct sources, or nothing
/// when no chunk has a known source.
pub fn sources_suffix(chunks: &[Chunk]) -> Option<String> {
    if !chunks.iter().any(Chunk::has_known_source) {
        return None;
    }
    Some(format!("\n\n📚 *Sources: {}*", distinct_sources(chunks).join(", ")))
}
