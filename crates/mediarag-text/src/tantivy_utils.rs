use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, INDEXED, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

pub const TEXT_TOKENIZER: &str = "text_with_stopwords";

/// Handles to every field of the media schema.
#[derive(Debug, Clone, Copy)]
pub struct MediaFields {
	pub item_id: Field,
	pub url: Field,
	pub title: Field,
	pub media_type: Field,
	pub content: Field,
	pub keywords: Field,
}

impl MediaFields {
	pub fn from_schema(schema: &Schema) -> anyhow::Result<Self> {
		Ok(Self {
			item_id: schema.get_field("item_id")?,
			url: schema.get_field("url")?,
			title: schema.get_field("title")?,
			media_type: schema.get_field("media_type")?,
			content: schema.get_field("content")?,
			keywords: schema.get_field("keywords")?,
		})
	}

	/// Map a caller-facing field name to a searchable text field.
	pub fn searchable(&self, name: &str) -> Option<Field> {
		match name {
			"content" => Some(self.content),
			"title" => Some(self.title),
			_ => None,
		}
	}
}

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	schema_builder.add_i64_field("item_id", INDEXED | STORED | FAST);
	schema_builder.add_text_field("url", STRING | STORED);
	schema_builder.add_text_field("media_type", STRING | STORED);
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(TEXT_TOKENIZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing).set_stored();
	schema_builder.add_text_field("title", text_options.clone());
	schema_builder.add_text_field("content", text_options);
	// keywords are stored lower-cased and matched verbatim
	schema_builder.add_text_field("keywords", STRING | STORED);
	schema_builder.build()
}

pub fn register_tokenizer(index: &Index) {
	let stop_words = vec![
		"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
	];
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
		.build();
	index.tokenizers().register(TEXT_TOKENIZER, tokenizer);
}

pub fn normalize_keyword(keyword: &str) -> String {
	keyword.trim().to_lowercase()
}
