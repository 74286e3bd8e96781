use anyhow::{bail, Result};
use arrow_array::{FixedSizeListArray, Int32Array, Int64Array, RecordBatch, RecordBatchIterator, StringArray};
use std::sync::Arc;
use tracing::{debug, info};

use mediarag_core::chunk::ContentChunk;
use mediarag_core::traits::Indexer;
use mediarag_core::types::ItemId;

use crate::schema::build_arrow_schema;
use crate::store::LanceVectorStore;
use crate::table::{ensure_table, table_names};

/// A chunk ready to be written, with its embedding.
#[derive(Debug, Clone)]
pub struct ChunkRow {
	pub id: String,
	pub item_id: ItemId,
	pub collection: String,
	pub content: String,
	pub chunk_index: usize,
	pub total_chunks: usize,
	pub vector: Vec<f32>,
}

impl ChunkRow {
	pub fn new(collection: &str, item_id: ItemId, chunk: ContentChunk, vector: Vec<f32>) -> Self {
		Self {
			id: format!("{collection}:{}", chunk.chunk_index),
			item_id,
			collection: collection.to_string(),
			content: chunk.content,
			chunk_index: chunk.chunk_index,
			total_chunks: chunk.total_chunks,
			vector,
		}
	}
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn rows_to_record_batch(rows: &[ChunkRow], dim: i32) -> Result<RecordBatch> {
	let schema = build_arrow_schema(dim);
	let mut ids = Vec::new(); let mut item_ids = Vec::new(); let mut collections = Vec::new(); let mut contents = Vec::new();
	let mut chunk_indices = Vec::new(); let mut total_chunks = Vec::new(); let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
	for row in rows {
		if row.vector.len() != dim as usize {
			bail!("embedding for {} has {} dimensions, expected {dim}", row.id, row.vector.len());
		}
		ids.push(row.id.clone()); item_ids.push(row.item_id); collections.push(row.collection.clone()); contents.push(row.content.clone());
		chunk_indices.push(row.chunk_index as i32); total_chunks.push(row.total_chunks as i32);
		vectors.push(Some(row.vector.iter().map(|&x| Some(x)).collect()));
	}
	let record_batch = RecordBatch::try_new(schema, vec![
		Arc::new(StringArray::from(ids)),
		Arc::new(Int64Array::from(item_ids)),
		Arc::new(StringArray::from(collections)),
		Arc::new(StringArray::from(contents)),
		Arc::new(Int32Array::from(chunk_indices)),
		Arc::new(Int32Array::from(total_chunks)),
		Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), dim)),
	])?;
	Ok(record_batch)
}

impl LanceVectorStore {
	async fn insert_rows(&self, collection: &str, rows: &[ChunkRow]) -> Result<()> {
		if rows.is_empty() {
			return ensure_table(&self.db, collection, build_arrow_schema(self.dim)).await;
		}
		let record_batch = rows_to_record_batch(rows, self.dim)?; let schema = record_batch.schema();
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		// a collection only appears once its rows are written
		if table_names(&self.db).await?.iter().any(|n| n == collection) {
			self.db.open_table(collection).execute().await?.add(reader).execute().await?;
		} else {
			self.db.create_table(collection, reader).execute().await?;
		}
		Ok(())
	}
}

impl Indexer for LanceVectorStore {
	fn index(&self, content: &str, collection_key: &str, item_id: ItemId) -> Result<()> {
		let chunks = self.chunker.chunk(content);
		let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
		let embeddings = if texts.is_empty() { Vec::new() } else { self.embedder.embed_batch(&texts)? };
		if embeddings.len() != chunks.len() {
			bail!("embedder returned {} vectors for {} chunks", embeddings.len(), chunks.len());
		}
		let rows: Vec<ChunkRow> = chunks.into_iter().zip(embeddings).map(|(chunk, vector)| ChunkRow::new(collection_key, item_id, chunk, vector)).collect();
		debug!(collection = collection_key, item_id, chunks = rows.len(), "embedding content");
		self.rt.block_on(self.insert_rows(collection_key, &rows))?;
		info!(collection = collection_key, item_id, chunks = rows.len(), "indexed content");
		Ok(())
	}
}
