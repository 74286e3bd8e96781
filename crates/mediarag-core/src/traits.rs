//! Collaborator seams consumed by the retrieval pipeline.
//!
//! Every trait is synchronous and `Send + Sync`; adapters that wrap async
//! clients block internally.

use crate::types::{CollectionRef, FullTextRow, ItemId, ScrapedArticle, StoredItem, VectorRecord};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

pub trait Scraper: Send + Sync {
    fn scrape(&self, url: &str) -> anyhow::Result<ScrapedArticle>;
}

pub trait ItemStore: Send + Sync {
    /// Persist a new item and return its id. Not idempotent.
    fn add_item(&self, url: &str, title: &str, media_type: &str, content: &str) -> anyhow::Result<ItemId>;
    fn items(&self) -> anyhow::Result<Vec<StoredItem>>;
}

pub trait Indexer: Send + Sync {
    /// Embed `content` into the vector collection `collection_key`.
    fn index(&self, content: &str, collection_key: &str, item_id: ItemId) -> anyhow::Result<()>;
}

pub trait VectorStore: Send + Sync {
    fn list_collections(&self) -> anyhow::Result<Vec<CollectionRef>>;
    /// Nearest neighbours of `query` in one collection, best first, at most `k`.
    fn search(&self, collection_key: &str, query: &str, k: usize) -> anyhow::Result<Vec<VectorRecord>>;
}

pub trait FullTextIndex: Send + Sync {
    /// Lexical search over `fields`. `filter` is a comma-separated keyword
    /// restriction (empty for none) and `page` is 1-based.
    fn search(
        &self,
        query: &str,
        fields: &[&str],
        filter: &str,
        page: usize,
        per_page: usize,
    ) -> anyhow::Result<Vec<FullTextRow>>;
}

pub trait KeywordIndex: Send + Sync {
    fn keywords_for_item(&self, item_id: ItemId) -> anyhow::Result<Vec<String>>;
    fn items_for_keyword(&self, keyword: &str) -> anyhow::Result<Vec<ItemId>>;
}

pub trait GenerationBackend: Send + Sync {
    fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}
