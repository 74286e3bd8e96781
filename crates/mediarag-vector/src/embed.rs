use anyhow::Result;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use mediarag_core::traits::Embedder;

pub const DEFAULT_DIM: usize = 256;

/// Deterministic bag-of-words embedder.
///
/// Every lower-cased token is hashed into one of `dim` buckets and the result
/// is L2-normalized, so texts sharing words land close together. Used in
/// development and tests where no model is available.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
	dim: usize,
}

impl HashEmbedder {
	pub fn new(dim: usize) -> Self {
		Self { dim: dim.max(1) }
	}

	fn embed_text(&self, text: &str) -> Vec<f32> {
		let mut v = vec![0f32; self.dim];
		for token in text.split_whitespace() {
			let token: String = token.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect();
			if token.is_empty() { continue; }
			let mut hasher = XxHash64::with_seed(0);
			token.hash(&mut hasher);
			let h = hasher.finish();
			#[allow(clippy::cast_possible_truncation)]
			let idx = (h % self.dim as u64) as usize;
			v[idx] += 1.0;
		}
		let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
		for x in &mut v { *x /= norm; }
		v
	}
}

impl Default for HashEmbedder {
	fn default() -> Self {
		Self::new(DEFAULT_DIM)
	}
}

impl Embedder for HashEmbedder {
	fn dim(&self) -> usize { self.dim }

	fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		Ok(texts.iter().map(|t| self.embed_text(t)).collect())
	}
}
