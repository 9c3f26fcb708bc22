//! Document loading: file path in, raw text units out.
//!
//! `.pdf` (any case) goes through PDF text extraction; everything else is read
//! as UTF-8 text. A file that cannot be read or yields no text is logged and
//! skipped, never fatal to the batch.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::{debug, warn};

use crate::error::Error;
use crate::types::{TextUnit, UNKNOWN_SOURCE};

/// Page separator emitted by the PDF text extractor.
const PAGE_BREAK: char = '\u{c}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Text,
}

impl FileKind {
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Self::Pdf,
            _ => Self::Text,
        }
    }
}

/// Base name of `path`, or the placeholder when there is none.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentLoader;

impl DocumentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a single file. Fails with [`Error::NotFound`] when the file is
    /// missing and [`Error::Ingest`] when it is unreadable or has no text.
    pub fn load_file(&self, path: &Path) -> Result<Vec<TextUnit>> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()).into());
        }
        let source = source_name(path);
        let texts = match FileKind::detect(path) {
            FileKind::Pdf => read_pdf(path),
            FileKind::Text => read_text(path).map(|t| vec![t]),
        }
        .map_err(|e| ingest_error(path, format!("{e:#}")))?;
        let units: Vec<TextUnit> = texts
            .into_iter()
            .filter(|t| !t.trim().is_empty())
            .map(|text| TextUnit { text, source: source.clone() })
            .collect();
        if units.is_empty() {
            return Err(ingest_error(path, "no text content"));
        }
        debug!(path = %path.display(), units = units.len(), "loaded file");
        Ok(units)
    }

    /// Load every path in order, skipping (and logging) the ones that fail.
    pub fn load_all<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<TextUnit> {
        let mut units = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match self.load_file(path) {
                Ok(mut loaded) => units.append(&mut loaded),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping file"),
            }
        }
        units
    }
}

fn ingest_error(path: &Path, reason: impl Into<String>) -> anyhow::Error {
    Error::Ingest { path: path.display().to_string(), reason: reason.into() }.into()
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).context("read failed")?;
    String::from_utf8(bytes).context("not valid UTF-8")
}

fn read_pdf(path: &Path) -> Result<Vec<String>> {
    // The extractor panics on some malformed files; treat that as a failed parse.
    let text = std::panic::catch_unwind(|| pdf_extract::extract_text(path))
        .map_err(|_| anyhow!("PDF parser aborted"))?
        .map_err(|e| anyhow!("PDF text extraction failed: {}", e))?;
    Ok(text.split(PAGE_BREAK).map(str::to_string).collect())
}
