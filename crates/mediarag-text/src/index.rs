use anyhow::{anyhow, Result};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use tantivy::collector::DocSetCollector;
use tantivy::directory::MmapDirectory;
use tantivy::query::{AllQuery, Query, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, TantivyDocument, Term};
use tracing::{debug, info, warn};

use mediarag_core::traits::{ItemStore, KeywordIndex};
use mediarag_core::types::{ItemId, StoredItem};

use crate::tantivy_utils::{build_schema, normalize_keyword, register_tokenizer, MediaFields};

const WRITER_MEMORY: usize = 50_000_000;

/// Commit pending operations. On failure they are rolled back so a later
/// commit cannot publish them.
fn commit_or_rollback<F>(writer: &mut IndexWriter, commit: F) -> Result<()>
where
	F: FnOnce(&mut IndexWriter) -> tantivy::Result<u64>,
{
	if let Err(e) = commit(writer) {
		if let Err(rollback) = writer.rollback() {
			warn!(error = %rollback, "rollback after failed commit also failed");
		}
		return Err(e.into());
	}
	Ok(())
}

/// Item to persist, with the keywords it is tagged with.
#[derive(Debug, Clone, Default)]
pub struct NewItem<'a> {
	pub url: &'a str,
	pub title: &'a str,
	pub media_type: &'a str,
	pub content: &'a str,
	pub keywords: &'a [&'a str],
}

/// Media items, their keyword tags and the global full-text index, all in one
/// tantivy index.
pub struct TantivyMediaStore {
	pub(crate) index: Index,
	pub(crate) fields: MediaFields,
	reader: IndexReader,
	writer: Mutex<IndexWriter>,
	next_id: AtomicI64,
}

impl TantivyMediaStore {
	pub fn in_ram() -> Result<Self> {
		Self::from_index(Index::create_in_ram(build_schema()))
	}

	/// Open the index in `index_dir`, creating it when absent.
	pub fn open_or_create(index_dir: &Path) -> Result<Self> {
		std::fs::create_dir_all(index_dir)?;
		let directory = MmapDirectory::open(index_dir)?;
		let index = Index::open_or_create(directory, build_schema())?;
		info!(dir = %index_dir.display(), "opened media index");
		Self::from_index(index)
	}

	fn from_index(index: Index) -> Result<Self> {
		register_tokenizer(&index);
		let fields = MediaFields::from_schema(&index.schema())?;
		let reader: IndexReader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		let writer: IndexWriter = index.writer(WRITER_MEMORY)?;
		let store = Self { index, fields, reader, writer: Mutex::new(writer), next_id: AtomicI64::new(1) };
		let max_id = store.all_items()?.iter().map(|i| i.id).max().unwrap_or(0);
		store.next_id.store(max_id + 1, Ordering::SeqCst);
		Ok(store)
	}

	/// Persist an item with its keyword tags and return the assigned id.
	pub fn add_tagged_item(&self, item: &NewItem<'_>) -> Result<ItemId> {
		let mut writer = self.writer.lock().map_err(|_| anyhow!("index writer lock poisoned"))?;
		let id = self.next_id.fetch_add(1, Ordering::SeqCst);
		let mut doc = TantivyDocument::default();
		doc.add_i64(self.fields.item_id, id);
		doc.add_text(self.fields.url, item.url);
		doc.add_text(self.fields.title, item.title);
		doc.add_text(self.fields.media_type, item.media_type);
		doc.add_text(self.fields.content, item.content);
		for keyword in item.keywords.iter().map(|k| normalize_keyword(k)).filter(|k| !k.is_empty()) {
			doc.add_text(self.fields.keywords, keyword);
		}
		writer.add_document(doc)?;
		commit_or_rollback(&mut writer, |w| w.commit())?;
		drop(writer);
		// the item is committed; a stale reader catches up on the next reload
		if let Err(e) = self.reader.reload() {
			warn!(item_id = id, error = %e, "reader reload failed after commit");
		}
		debug!(item_id = id, media_type = item.media_type, "stored item");
		Ok(id)
	}

	pub(crate) fn searcher(&self) -> Searcher {
		self.reader.searcher()
	}

	pub(crate) fn item_id_of(&self, doc: &TantivyDocument) -> Option<ItemId> {
		doc.get_first(self.fields.item_id).and_then(|v| v.as_i64())
	}

	pub(crate) fn text_of(&self, doc: &TantivyDocument, field: tantivy::schema::Field) -> String {
		doc.get_first(field).and_then(|v| v.as_str()).unwrap_or("").to_string()
	}

	fn matching_docs(&self, query: &dyn Query) -> Result<Vec<TantivyDocument>> {
		let searcher = self.searcher();
		let addresses = searcher.search(query, &DocSetCollector)?;
		let mut docs = Vec::with_capacity(addresses.len());
		for addr in addresses {
			docs.push(searcher.doc::<TantivyDocument>(addr)?);
		}
		Ok(docs)
	}

	fn all_items(&self) -> Result<Vec<StoredItem>> {
		let mut items: Vec<StoredItem> = self
			.matching_docs(&AllQuery)?
			.iter()
			.filter_map(|doc| {
				Some(StoredItem {
					id: self.item_id_of(doc)?,
					url: self.text_of(doc, self.fields.url),
					title: self.text_of(doc, self.fields.title),
					media_type: self.text_of(doc, self.fields.media_type),
					content: self.text_of(doc, self.fields.content),
				})
			})
			.collect();
		items.sort_by_key(|i| i.id);
		Ok(items)
	}

	pub(crate) fn keyword_term(&self, keyword: &str) -> TermQuery {
		TermQuery::new(Term::from_field_text(self.fields.keywords, &normalize_keyword(keyword)), IndexRecordOption::Basic)
	}
}

impl ItemStore for TantivyMediaStore {
	fn add_item(&self, url: &str, title: &str, media_type: &str, content: &str) -> Result<ItemId> {
		self.add_tagged_item(&NewItem { url, title, media_type, content, keywords: &[] })
	}

	fn items(&self) -> Result<Vec<StoredItem>> {
		self.all_items()
	}
}

impl KeywordIndex for TantivyMediaStore {
	fn keywords_for_item(&self, item_id: ItemId) -> Result<Vec<String>> {
		let query = TermQuery::new(Term::from_field_i64(self.fields.item_id, item_id), IndexRecordOption::Basic);
		let Some(doc) = self.matching_docs(&query)?.into_iter().next() else {
			return Ok(Vec::new());
		};
		Ok(doc.get_all(self.fields.keywords).filter_map(|v| v.as_str()).map(str::to_string).collect())
	}

	fn items_for_keyword(&self, keyword: &str) -> Result<Vec<ItemId>> {
		let mut ids: Vec<ItemId> = self.matching_docs(&self.keyword_term(keyword))?.iter().filter_map(|d| self.item_id_of(d)).collect();
		ids.sort_unstable();
		Ok(ids)
	}
}
