use anyhow::{anyhow, Result};
use arrow_array::{Array, Float32Array, Int32Array, Int64Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use tracing::debug;

use mediarag_core::traits::VectorStore;
use mediarag_core::types::{CollectionRef, Meta, VectorRecord, ITEM_ID_KEY};

use crate::store::LanceVectorStore;
use crate::table::table_names;

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
	batch
		.column_by_name(name)
		.and_then(|c| c.as_any().downcast_ref::<T>())
		.ok_or_else(|| anyhow!("{name} column missing"))
}

pub(crate) fn batch_to_records(batch: &RecordBatch) -> Result<Vec<VectorRecord>> {
	let ids = column::<StringArray>(batch, "id")?;
	let item_ids = column::<Int64Array>(batch, "item_id")?;
	let collections = column::<StringArray>(batch, "collection")?;
	let contents = column::<StringArray>(batch, "content")?;
	let chunk_indices = column::<Int32Array>(batch, "chunk_index")?;
	let distances = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>());
	let mut records = Vec::with_capacity(batch.num_rows());
	for i in 0..batch.num_rows() {
		let mut metadata = Meta::new();
		metadata.insert(ITEM_ID_KEY.to_string(), item_ids.value(i).to_string());
		metadata.insert("collection".to_string(), collections.value(i).to_string());
		metadata.insert("chunk_index".to_string(), chunk_indices.value(i).to_string());
		if let Some(d) = distances { metadata.insert("distance".to_string(), d.value(i).to_string()); }
		let content = (!contents.is_null(i)).then(|| contents.value(i).to_string());
		records.push(VectorRecord { id: ids.value(i).to_string(), content, metadata });
	}
	Ok(records)
}

impl LanceVectorStore {
	async fn vector_search(&self, collection: &str, query_vec: Vec<f32>, k: usize) -> Result<Vec<VectorRecord>> {
		let table = self.db.open_table(collection).execute().await?;
		let mut stream = table.vector_search(query_vec)?.limit(k).execute().await?;
		let mut records = Vec::new();
		while let Some(batch) = stream.try_next().await? {
			records.extend(batch_to_records(&batch)?);
		}
		records.truncate(k);
		Ok(records)
	}
}

impl VectorStore for LanceVectorStore {
	fn list_collections(&self) -> Result<Vec<CollectionRef>> {
		let names = self.rt.block_on(table_names(&self.db))?;
		Ok(names.into_iter().map(CollectionRef::new).collect())
	}

	fn search(&self, collection_key: &str, query: &str, k: usize) -> Result<Vec<VectorRecord>> {
		if k == 0 { return Ok(Vec::new()); }
		let query_vec = self
			.embedder
			.embed_batch(&[query.to_string()])?
			.pop()
			.ok_or_else(|| anyhow!("embedder returned no vector for query"))?;
		let records = self.rt.block_on(self.vector_search(collection_key, query_vec, k))?;
		debug!(collection = collection_key, k, hits = records.len(), "vector search");
		Ok(records)
	}
}
