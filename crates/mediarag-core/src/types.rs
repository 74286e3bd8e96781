//! Domain types shared by the retrieval pipeline and its adapters.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// Identifier of a stored content item (article, transcript, ...).
pub type ItemId = i64;
pub type Meta = HashMap<String, String>;

/// Set of item ids admitted by a keyword filter.
///
/// Wrapped in `Option` wherever it is consumed: `None` means no filtering was
/// requested, `Some(empty)` means filtering was requested and nothing matched.
pub type RelevantIdSet = BTreeSet<ItemId>;

/// Metadata key under which vector rows carry their owning item id.
pub const ITEM_ID_KEY: &str = "item_id";

/// Indicates which engine produced a hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Origin {
    Vector,
    FullText,
}

/// A single retrieved passage.
///
/// `content` is never empty once the hit is part of a result set. `origin` is
/// kept for debugging and tie-breaking; it does not weight ranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hit {
    pub content: String,
    pub source_id: Option<ItemId>,
    pub origin: Origin,
}

impl Hit {
    pub fn new(content: impl Into<String>, source_id: Option<ItemId>, origin: Origin) -> Self {
        Self { content: content.into(), source_id, origin }
    }

    /// Normalize a vector store row into a hit.
    ///
    /// Rows without usable content are not dropped: they are logged and their
    /// debug representation becomes the content.
    pub fn from_vector_record(record: VectorRecord) -> Self {
        let source_id = record.item_id();
        match record.content {
            Some(ref content) if !content.trim().is_empty() => Self {
                content: content.clone(),
                source_id,
                origin: Origin::Vector,
            },
            _ => {
                warn!(record = ?record, "unexpected result format: vector record has no content");
                Self { content: format!("{record:?}"), source_id, origin: Origin::Vector }
            }
        }
    }
}

impl From<FullTextRow> for Hit {
    /// Blank rows are coerced the same way as vector records.
    fn from(row: FullTextRow) -> Self {
        if row.content.trim().is_empty() {
            warn!(row = ?row, "unexpected result format: full-text row has no content");
            return Self { content: format!("{row:?}"), source_id: Some(row.id), origin: Origin::FullText };
        }
        Self { content: row.content, source_id: Some(row.id), origin: Origin::FullText }
    }
}

/// Raw row returned by a [`VectorStore`](crate::traits::VectorStore).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub content: Option<String>,
    pub metadata: Meta,
}

impl VectorRecord {
    /// Owning item id from the `item_id` metadata entry, if present and numeric.
    pub fn item_id(&self) -> Option<ItemId> {
        self.metadata.get(ITEM_ID_KEY).and_then(|v| v.trim().parse().ok())
    }
}

/// Row returned by a [`FullTextIndex`](crate::traits::FullTextIndex).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FullTextRow {
    pub id: ItemId,
    pub content: String,
}

/// Named partition of the vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CollectionRef {
    pub name: String,
}

impl CollectionRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapedArticle {
    pub title: String,
    pub content: String,
}

/// An item as persisted by an [`ItemStore`](crate::traits::ItemStore).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredItem {
    pub id: ItemId,
    pub url: String,
    pub title: String,
    pub media_type: String,
    pub content: String,
}

impl StoredItem {
    /// Vector collection key for this item, e.g. `article_12`.
    pub fn collection_key(&self) -> String {
        collection_key(&self.media_type, self.id)
    }
}

pub fn collection_key(media_type: &str, id: ItemId) -> String {
    format!("{media_type}_{id}")
}

/// Normalized query keywords: trimmed, lower-cased, de-duplicated.
///
/// An empty set disables keyword filtering; it never means "match nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet(BTreeSet<String>);

impl KeywordSet {
    /// Parse a comma-separated keyword string. Blank pieces are skipped.
    pub fn parse(input: &str) -> Self {
        Self(
            input
                .split(',')
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Case-insensitive membership test against any keyword in `tags`.
    pub fn intersects<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|t| self.0.contains(&t.as_ref().trim().to_lowercase()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Answer {
    pub answer: String,
    pub context: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Failure {
    pub error: String,
    pub details: String,
}

/// Terminal value of the single-URL pipeline.
///
/// Serializes to either `{"answer", "context"}` or `{"error", "details"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PipelineResult {
    Answer(Answer),
    Failure(Failure),
}

impl PipelineResult {
    pub fn answer(answer: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Answer(Answer { answer: answer.into(), context: context.into() })
    }

    pub fn failure(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Failure(Failure { error: error.into(), details: details.into() })
    }
}

impl From<Answer> for PipelineResult {
    fn from(answer: Answer) -> Self {
        Self::Answer(answer)
    }
}
