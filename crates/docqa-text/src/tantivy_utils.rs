use tantivy::schema::{IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer};
use tantivy::Index;

pub const TOKENIZER_NAME: &str = "chunk_text";
pub const ORDINAL_FIELD: &str = "ordinal";
pub const TEXT_FIELD: &str = "text";

/// Chunk text is indexed but not stored; the run's `DocumentSet` owns it.
pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	schema_builder.add_u64_field(ORDINAL_FIELD, STORED);
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(TOKENIZER_NAME).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
	schema_builder.add_text_field(TEXT_FIELD, text_options);
	schema_builder.build()
}

/// Every word counts toward BM25, so no stopword filter; only case is folded.
pub fn register_tokenizer(index: &Index) {
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default()).filter(LowerCaser).build();
	index.tokenizers().register(TOKENIZER_NAME, tokenizer);
}
