use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Value};
use tantivy::{doc, Index, IndexReader, IndexWriter, TantivyDocument};
use tracing::{debug, warn};

use docqa_core::error::Error;
use docqa_core::traits::Retriever;
use docqa_core::types::{Chunk, DocumentSet, SearchHit, SourceKind};
use docqa_core::Availability;

use crate::tantivy_utils::{build_schema, register_tokenizer, ORDINAL_FIELD, TEXT_FIELD};

const WRITER_HEAP_BYTES: usize = 50_000_000;

/// In-memory BM25 index over one run's chunks.
pub struct LexicalIndex {
	index: Index,
	reader: IndexReader,
	ordinal_field: Field,
	text_field: Field,
	docs: Arc<DocumentSet>,
}

impl LexicalIndex {
	pub fn build(docs: Arc<DocumentSet>) -> Result<Self> {
		if docs.is_empty() { return Err(Error::Index("no chunks to index".into()).into()); }
		let schema = build_schema();
		let index = Index::create_in_ram(schema.clone());
		register_tokenizer(&index);
		let ordinal_field = schema.get_field(ORDINAL_FIELD)?;
		let text_field = schema.get_field(TEXT_FIELD)?;

		// One indexing thread keeps segment layout, and so tie order, reproducible.
		let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
		for (ordinal, chunk) in docs.chunks().iter().enumerate() {
			writer.add_document(doc!(
				ordinal_field => ordinal as u64,
				text_field => chunk.content.clone(),
			))?;
		}
		writer.commit()?;

		let reader = index.reader()?;
		debug!(chunks = docs.len(), "lexical index built");
		Ok(Self { index, reader, ordinal_field, text_field, docs })
	}

	/// Build, reporting failure as an unavailable stage instead of an error.
	pub fn try_build(docs: Arc<DocumentSet>) -> Availability<Self> {
		Availability::from_result("lexical_index", Self::build(docs))
	}

	pub fn len(&self) -> usize { self.docs.len() }

	pub fn is_empty(&self) -> bool { self.docs.is_empty() }

	/// Up to `min(k, len)` hits: matching chunks by BM25 score, then the
	/// remaining chunks in order at score 0.
	pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
		if k == 0 { return Ok(Vec::new()); }
		let searcher = self.reader.searcher();
		let qp = QueryParser::for_index(&self.index, vec![self.text_field]);
		let (q, errors) = qp.parse_query_lenient(query);
		if !errors.is_empty() { warn!(?errors, "query parsed leniently"); }
		let top_docs = searcher.search(&q, &TopDocs::with_limit(k))?;
		let mut hits = Vec::with_capacity(top_docs.len());
		for (score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr)?;
			let ordinal = doc.get_first(self.ordinal_field).and_then(|v| v.as_u64()).ok_or_else(|| anyhow!("indexed chunk missing ordinal"))?;
			hits.push(SearchHit { ordinal: ordinal as usize, score, source: SourceKind::Text });
		}
		hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal).then(a.ordinal.cmp(&b.ordinal)));

		let wanted = k.min(self.docs.len());
		if hits.len() < wanted {
			let matched: HashSet<usize> = hits.iter().map(|h| h.ordinal).collect();
			let rest = (0..self.docs.len()).filter(|o| !matched.contains(o)).take(wanted - hits.len());
			hits.extend(rest.map(|ordinal| SearchHit { ordinal, score: 0.0, source: SourceKind::Text }));
		}
		debug!(matched = hits.iter().filter(|h| h.score > 0.0).count(), returned = hits.len(), "lexical search");
		Ok(hits)
	}
}

impl Retriever for LexicalIndex {
	fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Chunk>> {
		self.search(query, k)?
			.into_iter()
			.map(|h| self.docs.get(h.ordinal).cloned().ok_or_else(|| anyhow!("hit ordinal {} out of range", h.ordinal)))
			.collect()
	}

	fn name(&self) -> &str { "lexical" }
}
