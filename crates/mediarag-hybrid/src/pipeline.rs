//! The three retrieval-augmented answering operations and content
//! preprocessing.
//!
//! Each operation has its own failure policy:
//! - [`RetrievalPipeline::single_url_pipeline`] stops at the first failing
//!   stage and reports it as a [`Failure`](mediarag_core::Failure) value;
//! - [`RetrievalPipeline::broad_search`] tolerates failing vector collections
//!   but returns every other error;
//! - [`RetrievalPipeline::enhanced_search`] never fails and answers with a
//!   fixed apology instead.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use mediarag_core::config::Config;
use mediarag_core::context::assemble;
use mediarag_core::error::describe;
use mediarag_core::filter::{filter_by_id_set, filter_by_keyword_lookup};
use mediarag_core::traits::{FullTextIndex, Indexer, ItemStore, KeywordIndex, Scraper, VectorStore};
use mediarag_core::types::collection_key;
use mediarag_core::{Answer, AnswerGenerator, Backend, BackendRegistry, Error, KeywordResolver, KeywordSet, PipelineResult, Result};

use crate::retriever::MultiSourceRetriever;

pub const PIPELINE_SECTION: &str = "pipeline";
pub const NO_RESULTS_ANSWER: &str = "I couldn't find any relevant information based on your query and keywords.";
pub const ERROR_ANSWER: &str = "An error occurred while processing your request.";

/// Collaborators the pipeline works against.
pub struct PipelineContext {
    pub scraper: Arc<dyn Scraper>,
    pub store: Arc<dyn ItemStore>,
    pub indexer: Arc<dyn Indexer>,
    pub vectors: Arc<dyn VectorStore>,
    pub full_text: Arc<dyn FullTextIndex>,
    pub keywords: Arc<dyn KeywordIndex>,
    pub backends: BackendRegistry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub media_type: String,
    pub single_url_vector_k: usize,
    pub single_url_fts_k: usize,
    pub broad_vector_k: usize,
    pub broad_fts_k: usize,
    pub enhanced_vector_k: usize,
    pub enhanced_fts_k: usize,
    pub context_limit: usize,
    pub no_results_answer: String,
    pub error_answer: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            media_type: "article".to_string(),
            single_url_vector_k: 5,
            single_url_fts_k: 5,
            broad_vector_k: 2,
            broad_fts_k: 10,
            enhanced_vector_k: 5,
            enhanced_fts_k: 5,
            context_limit: 10,
            no_results_answer: NO_RESULTS_ANSWER.to_string(),
            error_answer: ERROR_ANSWER.to_string(),
        }
    }
}

pub struct RetrievalPipeline {
    ctx: PipelineContext,
    settings: PipelineSettings,
}

impl RetrievalPipeline {
    pub fn new(ctx: PipelineContext, settings: PipelineSettings) -> Self {
        Self { ctx, settings }
    }

    /// Settings from `[pipeline]`, defaults where absent.
    pub fn from_config(ctx: PipelineContext, config: &Config) -> Result<Self> {
        Ok(Self::new(ctx, config.section_or_default(PIPELINE_SECTION)?))
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    fn retriever(&self) -> MultiSourceRetriever<'_> {
        MultiSourceRetriever::new(self.ctx.vectors.as_ref(), self.ctx.full_text.as_ref())
    }

    fn generator(&self) -> AnswerGenerator<'_> {
        AnswerGenerator::new(&self.ctx.backends)
    }

    /// Scrape `url`, store and index it, then answer `query` from that
    /// article's collection plus the global full-text index.
    pub fn single_url_pipeline(&self, url: &str, query: &str, backend: Backend) -> PipelineResult {
        info!(url, %backend, "single-url pipeline");
        match self.run_single_url(url, query, backend) {
            Ok(answer) => answer.into(),
            Err(err) => {
                error!(url, error = %err, "single-url pipeline failed");
                PipelineResult::failure(err.stage_message(), err.details())
            }
        }
    }

    fn run_single_url(&self, url: &str, query: &str, backend: Backend) -> Result<Answer> {
        let article = self.ctx.scraper.scrape(url).map_err(|e| Error::Scrape(describe(&e)))?;
        let media_type = self.settings.media_type.as_str();
        let item_id = self
            .ctx
            .store
            .add_item(url, &article.title, media_type, &article.content)
            .map_err(|e| Error::Persist(describe(&e)))?;
        let collection = collection_key(media_type, item_id);
        self.ctx
            .indexer
            .index(&article.content, &collection, item_id)
            .map_err(|e| Error::Index(describe(&e)))?;

        let retriever = self.retriever();
        let mut hits = retriever
            .collection_hits(&collection, query, self.settings.single_url_vector_k)
            .map_err(|e| Error::Search(describe(&e)))?;
        hits.extend(
            retriever
                .full_text_hits(query, self.settings.single_url_fts_k)
                .map_err(|e| Error::Search(describe(&e)))?,
        );

        let context = assemble(&hits, hits.len());
        let answer = self.generator().generate(backend, &context, query)?;
        Ok(Answer { answer, context })
    }

    /// Search every collection and the full-text index, keep hits whose item
    /// carries one of `keywords`, and answer from the first few.
    pub fn broad_search(&self, query: &str, backend: Backend, keywords: &str) -> Result<Answer> {
        let keywords = KeywordSet::parse(keywords);
        info!(%backend, keywords = keywords.len(), "broad search");
        let collections = self.ctx.vectors.list_collections().map_err(|e| Error::Search(describe(&e)))?;
        let hits = self
            .retriever()
            .retrieve(query, &collections, self.settings.broad_vector_k, self.settings.broad_fts_k)
            .map_err(|e| Error::Search(describe(&e)))?;
        let admitted = filter_by_keyword_lookup(&hits, &keywords, self.ctx.keywords.as_ref());
        let context = assemble(&admitted, self.settings.context_limit);
        let answer = self.generator().generate(backend, &context, query)?;
        Ok(Answer { answer, context })
    }

    /// Like [`broad_search`](Self::broad_search) but keyword filtering is
    /// resolved to item ids up front and applied as results arrive. Never
    /// fails: errors are logged and answered with a fixed message.
    pub fn enhanced_search(&self, query: &str, backend: Backend, keywords: &str) -> Answer {
        info!(%backend, "enhanced search");
        match self.run_enhanced(query, backend, keywords) {
            Ok(answer) => answer,
            Err(err) => {
                error!(error = %err, "error in enhanced search");
                Answer { answer: self.settings.error_answer.clone(), context: String::new() }
            }
        }
    }

    fn run_enhanced(&self, query: &str, backend: Backend, keywords: &str) -> Result<Answer> {
        let keywords = KeywordSet::parse(keywords);
        let relevant = (!keywords.is_empty()).then(|| KeywordResolver::new(self.ctx.keywords.as_ref()).resolve(&keywords));

        let retriever = self.retriever();
        let collections = self.ctx.vectors.list_collections().map_err(|e| Error::Search(describe(&e)))?;
        let mut hits = retriever.vector_hits(query, &collections, self.settings.enhanced_vector_k, relevant.as_ref());
        let rows = retriever
            .full_text_hits(query, self.settings.enhanced_fts_k)
            .map_err(|e| Error::Search(describe(&e)))?;
        hits.extend(filter_by_id_set(&rows, relevant.as_ref()));

        if hits.is_empty() {
            warn!(keywords = keywords.len(), "no results after filtering");
            return Ok(Answer { answer: self.settings.no_results_answer.clone(), context: String::new() });
        }
        let context = assemble(&hits, self.settings.context_limit);
        let answer = self.generator().generate(backend, &context, query)?;
        Ok(Answer { answer, context })
    }

    /// Index every stored item whose vector collection does not exist yet.
    /// Items that fail are logged and skipped. Returns how many were indexed.
    pub fn preprocess_all_content(&self) -> Result<usize> {
        let items = self.ctx.store.items().map_err(|e| Error::Operation(describe(&e)))?;
        let existing: HashSet<String> = self
            .ctx
            .vectors
            .list_collections()
            .map_err(|e| Error::Operation(describe(&e)))?
            .into_iter()
            .map(|c| c.name)
            .collect();
        let mut indexed = 0;
        for item in &items {
            let key = item.collection_key();
            if existing.contains(&key) {
                continue;
            }
            match self.ctx.indexer.index(&item.content, &key, item.id) {
                Ok(()) => {
                    info!(item_id = item.id, collection = %key, "processed and indexed content");
                    indexed += 1;
                }
                Err(e) => error!(item_id = item.id, error = %describe(&e), "error processing item"),
            }
        }
        info!(total = items.len(), indexed, "preprocessed stored content");
        Ok(indexed)
    }
}
