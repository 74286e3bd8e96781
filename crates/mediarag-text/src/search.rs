use anyhow::{bail, Result};
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser};
use tantivy::TantivyDocument;
use tracing::{debug, warn};

use mediarag_core::traits::FullTextIndex;
use mediarag_core::types::{FullTextRow, KeywordSet};

use crate::index::TantivyMediaStore;

impl TantivyMediaStore {
	fn build_query(&self, query_text: &str, fields: &[&str], filter: &str) -> Result<Box<dyn Query>> {
		let names: &[&str] = if fields.is_empty() { &["content"] } else { fields };
		let mut search_fields = Vec::with_capacity(names.len());
		for name in names {
			match self.fields.searchable(name) {
				Some(f) => search_fields.push(f),
				None => bail!("unknown search field: {name}"),
			}
		}
		let query_parser = QueryParser::for_index(&self.index, search_fields);
		let (text_query, errors) = query_parser.parse_query_lenient(query_text);
		if !errors.is_empty() {
			warn!(query = query_text, errors = errors.len(), "query parsed leniently");
		}
		let keywords = KeywordSet::parse(filter);
		if keywords.is_empty() {
			return Ok(text_query);
		}
		let any_keyword: Vec<(Occur, Box<dyn Query>)> =
			keywords.iter().map(|k| (Occur::Should, Box::new(self.keyword_term(k)) as Box<dyn Query>)).collect();
		Ok(Box::new(BooleanQuery::new(vec![(Occur::Must, text_query), (Occur::Must, Box::new(BooleanQuery::new(any_keyword)))])))
	}
}

impl FullTextIndex for TantivyMediaStore {
	fn search(&self, query: &str, fields: &[&str], filter: &str, page: usize, per_page: usize) -> Result<Vec<FullTextRow>> {
		if per_page == 0 {
			return Ok(Vec::new());
		}
		let q = self.build_query(query, fields, filter)?;
		let offset = page.max(1).saturating_sub(1).saturating_mul(per_page);
		let searcher = self.searcher();
		let top_docs = searcher.search(&*q, &TopDocs::with_limit(per_page).and_offset(offset))?;
		let mut rows = Vec::with_capacity(top_docs.len());
		for (_score, addr) in top_docs {
			let doc: TantivyDocument = searcher.doc(addr)?;
			if let Some(id) = self.item_id_of(&doc) {
				rows.push(FullTextRow { id, content: self.text_of(&doc, self.fields.content) });
			}
		}
		debug!(query, page, per_page, hits = rows.len(), "full-text search");
		Ok(rows)
	}
}
