use std::sync::Arc;

use mediarag_core::chunk::ChunkingConfig;
use mediarag_core::traits::{Embedder, Indexer, VectorStore};
use mediarag_core::types::collection_key;
use mediarag_vector::{HashEmbedder, LanceVectorStore};
use tempfile::TempDir;

fn open(tmp: &TempDir) -> LanceVectorStore {
    let uri = tmp.path().to_string_lossy().to_string();
    LanceVectorStore::open(&uri, Arc::new(HashEmbedder::new(64)), ChunkingConfig::default()).expect("store")
}

#[test]
fn one_collection_per_indexed_item() {
    let tmp = TempDir::new().expect("tmp");
    let store = open(&tmp);
    assert!(store.list_collections().expect("list").is_empty());

    store.index("CO2 rises every year.\n\nClimate change follows.", &collection_key("article", 1), 1).expect("index 1");
    store.index("Coral reefs bleach in warm oceans.", &collection_key("article", 2), 2).expect("index 2");

    let mut names: Vec<String> = store.list_collections().expect("list").into_iter().map(|c| c.name).collect();
    names.sort();
    assert_eq!(names, vec!["article_1", "article_2"]);
}

#[test]
fn search_is_bounded_and_carries_item_id() {
    let tmp = TempDir::new().expect("tmp");
    let store = open(&tmp);
    let content = "CO2 rises.\n\nOceans warm.\n\nIce melts.\n\nSeas rise.";
    store.index(content, "article_7", 7).expect("index");

    let records = store.search("article_7", "CO2 rises", 2).expect("search");
    assert_eq!(records.len(), 2);
    for r in &records {
        assert_eq!(r.item_id(), Some(7));
        assert!(r.content.as_deref().is_some_and(|c| !c.is_empty()));
        assert!(r.metadata.contains_key("chunk_index"));
    }
    assert_eq!(records[0].content.as_deref(), Some("CO2 rises."));
    assert_eq!(store.search("article_7", "anything", 10).expect("search").len(), 4);
    assert!(store.search("article_7", "anything", 0).expect("k=0").is_empty());
}

/// Reports a smaller dimension than the vectors it produces.
struct MisreportedDim(HashEmbedder);

impl Embedder for MisreportedDim {
    fn dim(&self) -> usize { 32 }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> { self.0.embed_batch(texts) }
}

#[test]
fn failed_index_leaves_no_collection() {
    let tmp = TempDir::new().expect("tmp");
    let uri = tmp.path().to_string_lossy().to_string();
    let store = LanceVectorStore::open(&uri, Arc::new(MisreportedDim(HashEmbedder::new(64))), ChunkingConfig::default()).expect("store");

    let err = store.index("CO2 rises every year.", "article_1", 1).expect_err("dimension mismatch");
    assert!(format!("{err:#}").contains("expected 32"));
    assert!(store.list_collections().expect("list").is_empty());
}

#[test]
fn appends_to_an_existing_collection() {
    let tmp = TempDir::new().expect("tmp");
    let store = open(&tmp);
    store.index("Sourdough needs a lively starter.", "article_5", 5).expect("first");
    store.index("Feed the starter daily.", "article_5", 5).expect("second");
    assert_eq!(store.list_collections().expect("list").len(), 1);
    assert_eq!(store.search("article_5", "starter", 10).expect("search").len(), 2);
}

#[test]
fn missing_collection_is_an_error() {
    let tmp = TempDir::new().expect("tmp");
    let store = open(&tmp);
    assert!(store.search("article_404", "CO2", 5).is_err());
}

#[test]
fn collections_survive_reopen() {
    let tmp = TempDir::new().expect("tmp");
    {
        let store = open(&tmp);
        store.index("Sourdough needs a lively starter.", "article_3", 3).expect("index");
    }
    let store = open(&tmp);
    let records = store.search("article_3", "starter", 5).expect("search");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "article_3:0");
}
