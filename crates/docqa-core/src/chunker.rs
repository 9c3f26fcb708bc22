//! Recursive character chunking with overlap.
//!
//! Text is cut on the first separator (paragraph, line, sentence, word,
//! character) that occurs in it; separators stay attached to the start of the
//! piece that follows them. Pieces that are still too long are split again with
//! the remaining separators, and short pieces are merged greedily into windows
//! of at most `chunk_size` characters. When a window is emitted, pieces are
//! dropped from its front until at most `chunk_overlap` characters remain, and
//! those carry over into the next chunk.

use std::collections::VecDeque;

use crate::config::ChunkingSettings;
use crate::types::{Chunk, DocumentSet, TextUnit};

pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::from_settings(&ChunkingSettings::default())
    }
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size: chunk_size.max(1), chunk_overlap: chunk_overlap.min(chunk_size) }
    }

    pub fn from_settings(settings: &ChunkingSettings) -> Self {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Chunk every unit in order. `chunk_id` keeps counting across units.
    pub fn chunk_units(&self, units: &[TextUnit]) -> DocumentSet {
        let mut chunks = Vec::new();
        for unit in units {
            for content in self.split_text(&unit.text) {
                let chunk_id = chunks.len();
                chunks.push(Chunk { content, source: unit.source.clone(), chunk_id });
            }
        }
        DocumentSet::new(chunks)
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &DEFAULT_SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = separators.last().copied().unwrap_or("");
        let mut remaining: &[&str] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = sep;
                break;
            }
            if text.contains(sep) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut final_chunks = Vec::new();
        let mut good: Vec<&str> = Vec::new();
        for piece in split_keep_start(text, separator) {
            if char_len(piece) < self.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                final_chunks.extend(self.merge(&good));
                good.clear();
            }
            if remaining.is_empty() {
                final_chunks.push(piece.to_string());
            } else {
                final_chunks.extend(self.split_recursive(piece, remaining));
            }
        }
        if !good.is_empty() {
            final_chunks.extend(self.merge(&good));
        }
        final_chunks
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;
        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                if let Some(chunk) = join_trimmed(&window) {
                    out.push(chunk);
                }
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            window.push_back(piece);
            total += len;
        }
        if let Some(chunk) = join_trimmed(&window) {
            out.push(chunk);
        }
        out
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join_trimmed(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Split `text` before every occurrence of `separator`, keeping the separator
/// on the following piece. An empty separator splits into characters.
fn split_keep_start<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}
