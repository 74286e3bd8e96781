use anyhow::Result;
use tracing::{debug, error};

use mediarag_core::filter::filter_by_id_set;
use mediarag_core::traits::{FullTextIndex, VectorStore};
use mediarag_core::types::{CollectionRef, Hit, RelevantIdSet};

pub const FULL_TEXT_FIELDS: [&str; 1] = ["content"];

/// Queries the vector collections and the global full-text index and
/// concatenates what they return. No score fusion: vector hits come first in
/// collection order, then full-text hits in engine rank.
pub struct MultiSourceRetriever<'a> {
    vectors: &'a dyn VectorStore,
    full_text: &'a dyn FullTextIndex,
}

impl<'a> MultiSourceRetriever<'a> {
    pub fn new(vectors: &'a dyn VectorStore, full_text: &'a dyn FullTextIndex) -> Self {
        Self { vectors, full_text }
    }

    /// Top `k` hits from one collection. Failures are returned.
    pub fn collection_hits(&self, collection: &str, query: &str, k: usize) -> Result<Vec<Hit>> {
        let records = self.vectors.search(collection, query, k)?;
        Ok(records.into_iter().take(k).map(Hit::from_vector_record).collect())
    }

    /// Top `k` hits from every collection, each admitted by `relevant` as it
    /// arrives. A failing collection is logged and contributes nothing.
    pub fn vector_hits(&self, query: &str, collections: &[CollectionRef], k: usize, relevant: Option<&RelevantIdSet>) -> Vec<Hit> {
        let mut hits = Vec::new();
        for collection in collections {
            match self.collection_hits(&collection.name, query, k) {
                Ok(found) => {
                    let admitted = filter_by_id_set(&found, relevant);
                    debug!(collection = %collection.name, found = found.len(), admitted = admitted.len(), "vector search");
                    hits.extend(admitted);
                }
                Err(e) => error!(collection = %collection.name, error = %format!("{e:#}"), "error searching collection"),
            }
        }
        hits
    }

    /// One global, unfiltered full-text query: first page of `k` rows.
    pub fn full_text_hits(&self, query: &str, k: usize) -> Result<Vec<Hit>> {
        let rows = self.full_text.search(query, &FULL_TEXT_FIELDS, "", 1, k)?;
        debug!(found = rows.len(), "full-text search");
        Ok(rows.into_iter().map(Hit::from).collect())
    }

    /// Vector hits from all `collections` followed by full-text hits.
    pub fn retrieve(&self, query: &str, collections: &[CollectionRef], vector_k: usize, fts_k: usize) -> Result<Vec<Hit>> {
        let mut hits = self.vector_hits(query, collections, vector_k, None);
        hits.extend(self.full_text_hits(query, fts_k)?);
        Ok(hits)
    }
}
