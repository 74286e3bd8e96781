use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use mediarag_core::chunk::ChunkingConfig;
use mediarag_core::traits::{Embedder, GenerationBackend, Scraper, VectorStore};
use mediarag_core::types::ScrapedArticle;
use mediarag_core::{Backend, BackendRegistry, PipelineResult};
use mediarag_hybrid::{PipelineContext, PipelineSettings, RetrievalPipeline};
use mediarag_text::{NewItem, TantivyMediaStore};
use mediarag_vector::{HashEmbedder, LanceVectorStore};
use tempfile::TempDir;

struct FixedPage;

impl Scraper for FixedPage {
    fn scrape(&self, _url: &str) -> Result<ScrapedArticle> {
        Ok(ScrapedArticle {
            title: "Warming seas".into(),
            content: "Ocean heat content hit a record.\n\nCoral reefs bleach as seas warm.".into(),
        })
    }
}

#[derive(Default)]
struct Echo(Mutex<Vec<String>>);

impl GenerationBackend for Echo {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.0.lock().unwrap().push(prompt.to_string());
        Ok(format!("echo {} chars", prompt.len()))
    }
}

struct Shared(Arc<Echo>);

impl GenerationBackend for Shared {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.0.complete(prompt)
    }
}

/// Returns vectors of the wrong width on its first call only.
struct FlakyEmbedder {
    inner: HashEmbedder,
    tripped: AtomicBool,
}

impl Embedder for FlakyEmbedder {
    fn dim(&self) -> usize {
        self.inner.dim()
    }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = self.inner.embed_batch(texts)?;
        if !self.tripped.swap(true, Ordering::SeqCst) {
            vectors.iter_mut().for_each(|v| v.push(0.0));
        }
        Ok(vectors)
    }
}

fn build(tmp: &TempDir) -> (RetrievalPipeline, Arc<TantivyMediaStore>, Arc<LanceVectorStore>, Arc<Echo>) {
    build_with(tmp, Arc::new(HashEmbedder::default()))
}

fn build_with(tmp: &TempDir, embedder: Arc<dyn Embedder>) -> (RetrievalPipeline, Arc<TantivyMediaStore>, Arc<LanceVectorStore>, Arc<Echo>) {
    let text = Arc::new(TantivyMediaStore::open_or_create(&tmp.path().join("tantivy")).expect("text store"));
    let uri = tmp.path().join("lancedb").to_string_lossy().to_string();
    let vectors = Arc::new(LanceVectorStore::open(&uri, embedder, ChunkingConfig::default()).expect("vector store"));
    let echo = Arc::new(Echo::default());
    let ctx = PipelineContext {
        scraper: Arc::new(FixedPage),
        store: text.clone(),
        indexer: vectors.clone(),
        vectors: vectors.clone(),
        full_text: text.clone(),
        keywords: text.clone(),
        backends: BackendRegistry::new().with(Backend::LlamaCpp, Box::new(Shared(echo.clone()))),
    };
    (RetrievalPipeline::new(ctx, PipelineSettings::default()), text, vectors, echo)
}

#[test]
fn end_to_end_over_real_indexes() {
    mediarag_core::logging::init_tracing("mediarag=debug");
    let tmp = TempDir::new().expect("tmp");
    let (pipeline, text, vectors, echo) = build(&tmp);

    text.add_tagged_item(&NewItem {
        url: "https://a.example/co2",
        title: "Carbon",
        media_type: "article",
        content: "CO2 rises as climate change accelerates.",
        keywords: &["climate"],
    })
    .expect("add");
    text.add_tagged_item(&NewItem {
        url: "https://b.example/bread",
        title: "Bread",
        media_type: "article",
        content: "Sourdough rises overnight.",
        keywords: &["baking"],
    })
    .expect("add");
    assert_eq!(pipeline.preprocess_all_content().expect("preprocess"), 2);
    assert_eq!(pipeline.preprocess_all_content().expect("second pass"), 0);
    assert_eq!(vectors.list_collections().expect("list").len(), 2);

    let answer = pipeline.enhanced_search("rises", Backend::LlamaCpp, "climate");
    assert!(answer.context.contains("CO2 rises"));
    assert!(!answer.context.contains("Sourdough"));
    assert!(answer.answer.starts_with("echo"));

    let answer = pipeline.broad_search("rises", Backend::LlamaCpp, "baking").expect("broad");
    assert!(answer.context.contains("Sourdough"));
    assert!(!answer.context.contains("CO2"));

    let answer = pipeline.enhanced_search("rises", Backend::LlamaCpp, "gardening");
    assert_eq!(answer.context, "");
    assert_eq!(echo.0.lock().unwrap().len(), 2);

    match pipeline.single_url_pipeline("https://c.example/seas", "coral reefs", Backend::LlamaCpp) {
        PipelineResult::Answer(a) => assert!(a.context.contains("Coral reefs bleach")),
        PipelineResult::Failure(f) => panic!("pipeline failed: {f:?}"),
    }
    assert!(vectors.list_collections().expect("list").iter().any(|c| c.name == "article_3"));
}

#[test]
fn failed_indexing_is_retried_on_the_next_pass() {
    let tmp = TempDir::new().expect("tmp");
    let embedder = Arc::new(FlakyEmbedder { inner: HashEmbedder::default(), tripped: AtomicBool::new(false) });
    let (pipeline, text, vectors, _) = build_with(&tmp, embedder);
    text.add_tagged_item(&NewItem {
        url: "https://a.example/co2",
        title: "Carbon",
        media_type: "article",
        content: "CO2 rises as climate change accelerates.",
        keywords: &["climate"],
    })
    .expect("add");

    assert_eq!(pipeline.preprocess_all_content().expect("first pass"), 0);
    assert!(vectors.list_collections().expect("list").is_empty());

    assert_eq!(pipeline.preprocess_all_content().expect("second pass"), 1);
    let records = vectors.search("article_1", "CO2", 5).expect("search");
    assert_eq!(records.len(), 1);
}
