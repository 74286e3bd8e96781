//! mediarag-llm
//!
//! HTTP adapters for the text-generation backends, each exposing the single
//! `complete(prompt)` capability, and [`build_registry`] to assemble them
//! from configuration.
pub mod anthropic;
pub mod chat;
pub mod cohere;
pub mod completion;
pub mod error;
pub mod http;
pub mod registry;
pub mod settings;

pub use error::{LlmError, LlmResult};
pub use registry::{build_adapter, build_registry};
pub use settings::BackendSettings;
