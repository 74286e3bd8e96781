//! Backend selection and answer generation.
//!
//! [`Backend`] is the closed set of generation services a caller may choose.
//! Each variant is served by whatever adapter is registered for it in a
//! [`BackendRegistry`]; adding a service means adding a variant.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error};

use crate::error::{describe, Error, Result};
use crate::traits::GenerationBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Backend {
    OpenAi,
    Anthropic,
    Cohere,
    Groq,
    OpenRouter,
    HuggingFace,
    DeepSeek,
    Mistral,
    LocalLlm,
    LlamaCpp,
    Kobold,
    Ooba,
    TabbyApi,
    Vllm,
    Ollama,
    CustomOpenAi,
}

impl Backend {
    pub const ALL: [Backend; 16] = [
        Self::OpenAi,
        Self::Anthropic,
        Self::Cohere,
        Self::Groq,
        Self::OpenRouter,
        Self::HuggingFace,
        Self::DeepSeek,
        Self::Mistral,
        Self::LocalLlm,
        Self::LlamaCpp,
        Self::Kobold,
        Self::Ooba,
        Self::TabbyApi,
        Self::Vllm,
        Self::Ollama,
        Self::CustomOpenAi,
    ];

    /// Display label, as offered to users.
    pub fn label(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Cohere => "Cohere",
            Self::Groq => "Groq",
            Self::OpenRouter => "OpenRouter",
            Self::HuggingFace => "HuggingFace",
            Self::DeepSeek => "DeepSeek",
            Self::Mistral => "Mistral",
            Self::LocalLlm => "Local-LLM",
            Self::LlamaCpp => "Llama.cpp",
            Self::Kobold => "Kobold",
            Self::Ooba => "Ooba",
            Self::TabbyApi => "TabbyAPI",
            Self::Vllm => "vLLM",
            Self::Ollama => "ollama",
            Self::CustomOpenAi => "Custom-OpenAI-API",
        }
    }

    /// Runs on the local machine rather than a hosted API.
    pub fn is_local(self) -> bool {
        matches!(
            self,
            Self::LocalLlm | Self::LlamaCpp | Self::Kobold | Self::Ooba | Self::TabbyApi | Self::Vllm | Self::Ollama
        )
    }
}

// "Llama.cpp", "llama_cpp" and "LLAMA-CPP" all name the same backend.
fn fold(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).map(|c| c.to_ascii_lowercase()).collect()
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = fold(s);
        Self::ALL
            .into_iter()
            .find(|b| fold(b.label()) == wanted)
            .ok_or_else(|| Error::UnsupportedBackend(s.to_string()))
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Backend {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Backend {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Adapters keyed by backend.
#[derive(Default)]
pub struct BackendRegistry {
    adapters: HashMap<Backend, Box<dyn GenerationBackend>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, backend: Backend, adapter: Box<dyn GenerationBackend>) -> &mut Self {
        self.adapters.insert(backend, adapter);
        self
    }

    pub fn with(mut self, backend: Backend, adapter: Box<dyn GenerationBackend>) -> Self {
        self.register(backend, adapter);
        self
    }

    pub fn get(&self, backend: Backend) -> Option<&dyn GenerationBackend> {
        self.adapters.get(&backend).map(|b| b.as_ref())
    }

    pub fn backends(&self) -> Vec<Backend> {
        let mut list: Vec<Backend> = self.adapters.keys().copied().collect();
        list.sort();
        list
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

pub fn build_prompt(context: &str, query: &str) -> String {
    format!("Context: {context}\n\nQuestion: {query}")
}

pub struct AnswerGenerator<'a> {
    registry: &'a BackendRegistry,
}

impl<'a> AnswerGenerator<'a> {
    pub fn new(registry: &'a BackendRegistry) -> Self {
        Self { registry }
    }

    /// Send `context` and `query` to the adapter registered for `backend`.
    ///
    /// The only validation done here is that an adapter exists; whatever the
    /// adapter reports is passed through as a generation failure.
    pub fn generate(&self, backend: Backend, context: &str, query: &str) -> Result<String> {
        let adapter = self
            .registry
            .get(backend)
            .ok_or_else(|| Error::UnsupportedBackend(backend.label().to_string()))?;
        let prompt = build_prompt(context, query);
        debug!(%backend, prompt_chars = prompt.len(), "dispatching prompt");
        adapter.complete(&prompt).map_err(|e| {
            let details = describe(&e);
            error!(%backend, error = %details, "generation backend failed");
            Error::Generation(details)
        })
    }
}
