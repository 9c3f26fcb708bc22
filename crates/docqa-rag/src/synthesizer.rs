//! The three answer strategies. Each one turns every failure into a
//! `❌`-prefixed answer string.

use anyhow::Result;
use tracing::{debug, warn};

use docqa_core::traits::{LanguageModel, Retriever};
use docqa_core::types::{Chunk, DocumentSet};

use crate::answer::{direct_error, distinct_sources, fallback_error, rag_error, sources_suffix};
use crate::prompt::{fallback_prompt, join_context, rag_prompt};

/// Answer text plus the distinct sources that contributed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub answer: String,
    pub sources: Vec<String>,
}

impl Synthesis {
    fn bare(answer: String) -> Self {
        Self { answer, sources: Vec::new() }
    }
}

pub struct Synthesizer<'a> {
    model: &'a dyn LanguageModel,
    top_k: usize,
    fallback_chunks: usize,
}

impl<'a> Synthesizer<'a> {
    pub fn new(model: &'a dyn LanguageModel, top_k: usize, fallback_chunks: usize) -> Self {
        Self { model, top_k, fallback_chunks }
    }

    /// No documents: the raw query goes to the model.
    pub fn direct(&self, query: &str) -> Synthesis {
        match self.model.invoke(query) {
            Ok(r) => Synthesis::bare(r.text),
            Err(e) => {
                warn!(error = %e, "direct answer failed");
                Synthesis::bare(direct_error(e))
            }
        }
    }

    /// Documents but no retriever: the leading chunks become the context.
    pub fn context_fallback(&self, docs: &DocumentSet, query: &str) -> Synthesis {
        let context = join_context(docs.head(self.fallback_chunks));
        match self.model.invoke(&fallback_prompt(&context, query)) {
            Ok(r) => Synthesis::bare(r.text),
            Err(e) => {
                warn!(error = %e, "fallback answer failed");
                Synthesis::bare(fallback_error(e))
            }
        }
    }

    /// Retrieve, fill the template, answer, and cite sources.
    pub fn grounded(&self, retriever: &dyn Retriever, query: &str) -> Synthesis {
        match self.try_grounded(retriever, query) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, retriever = retriever.name(), "rag answer failed");
                Synthesis::bare(rag_error(e))
            }
        }
    }

    fn try_grounded(&self, retriever: &dyn Retriever, query: &str) -> Result<Synthesis> {
        let chunks: Vec<Chunk> = retriever.retrieve(query, self.top_k)?;
        debug!(retriever = retriever.name(), retrieved = chunks.len(), "context retrieved");
        let response = self.model.invoke(&rag_prompt(&join_context(&chunks), query))?;
        let mut answer = response.text;
        if let Some(suffix) = sources_suffix(&chunks) {
            answer.push_str(&suffix);
        }
        Ok(Synthesis { answer, sources: distinct_sources(&chunks) })
    }
}
