//! mediarag-core
//!
//! Data model, collaborator traits and the retrieval building blocks shared
//! by the adapters and the pipeline: keyword resolution, hit filtering,
//! context assembly and answer generation.
#![deny(dead_code)]
#![deny(unused_variables)]

pub mod chunk;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod generate;
pub mod keywords;
pub mod logging;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use generate::{AnswerGenerator, Backend, BackendRegistry};
pub use keywords::KeywordResolver;
pub use types::{Answer, CollectionRef, Failure, FullTextRow, Hit, ItemId, KeywordSet, Origin, PipelineResult, RelevantIdSet, VectorRecord};
