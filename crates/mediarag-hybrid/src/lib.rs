//! mediarag-hybrid
//!
//! Fuses vector and full-text retrieval into context for answer generation.
pub mod pipeline;
pub mod retriever;

pub use pipeline::{PipelineContext, PipelineSettings, RetrievalPipeline};
pub use retriever::MultiSourceRetriever;
