use anyhow::{Context, Result};
use lancedb::Connection;
use std::sync::Arc;
use tokio::runtime::Runtime;

use mediarag_core::chunk::{Chunker, ChunkingConfig};
use mediarag_core::traits::Embedder;

use crate::table::open_db;

/// LanceDB database with one table per collection.
///
/// The store owns a tokio runtime and blocks on it, so it must not be used
/// from inside another runtime.
pub struct LanceVectorStore {
	pub(crate) rt: Runtime,
	pub(crate) db: Connection,
	pub(crate) embedder: Arc<dyn Embedder>,
	pub(crate) chunker: Chunker,
	pub(crate) dim: i32,
}

impl LanceVectorStore {
	pub fn open(uri: &str, embedder: Arc<dyn Embedder>, chunking: ChunkingConfig) -> Result<Self> {
		let dim = i32::try_from(embedder.dim()).context("embedding dimension out of range")?;
		let rt = Runtime::new()?;
		let db = rt.block_on(open_db(uri))?;
		tracing::info!(uri, dim, "opened vector store");
		Ok(Self { rt, db, embedder, chunker: Chunker::new(chunking), dim })
	}
}
