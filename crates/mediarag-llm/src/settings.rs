//! Per-backend connection settings, read from `[generation.<label>]`.

use serde::{Deserialize, Serialize};

use mediarag_core::Backend;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Falls back to the backend's conventional environment variable.
    pub api_key: Option<String>,
    pub url: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    /// Ollama only: attempts while the model reports it is still loading.
    pub max_retries: u32,
    pub retry_delay_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            url: None,
            model: None,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
            timeout_secs: 120,
            max_retries: 5,
            retry_delay_secs: 20,
        }
    }
}

impl BackendSettings {
    pub fn resolved_url(&self, backend: Backend) -> Option<String> {
        self.url.clone().filter(|u| !u.trim().is_empty()).or_else(|| default_url(backend).map(str::to_string))
    }

    pub fn resolved_model(&self, backend: Backend) -> Option<String> {
        self.model.clone().filter(|m| !m.trim().is_empty()).or_else(|| default_model(backend).map(str::to_string))
    }

    pub fn resolved_api_key(&self, backend: Backend) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| api_key_env(backend).and_then(|var| std::env::var(var).ok()))
    }

    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}

pub fn default_url(backend: Backend) -> Option<&'static str> {
    match backend {
        Backend::OpenAi => Some("https://api.openai.com/v1/chat/completions"),
        Backend::Anthropic => Some("https://api.anthropic.com/v1/messages"),
        Backend::Cohere => Some("https://api.cohere.com/v2/chat"),
        Backend::Groq => Some("https://api.groq.com/openai/v1/chat/completions"),
        Backend::OpenRouter => Some("https://openrouter.ai/api/v1/chat/completions"),
        Backend::HuggingFace => Some("https://router.huggingface.co/v1/chat/completions"),
        Backend::DeepSeek => Some("https://api.deepseek.com/chat/completions"),
        Backend::Mistral => Some("https://api.mistral.ai/v1/chat/completions"),
        Backend::LocalLlm => Some("http://127.0.0.1:8080/v1/chat/completions"),
        Backend::LlamaCpp => Some("http://127.0.0.1:8080/completion"),
        Backend::Kobold => Some("http://127.0.0.1:5001/api/v1/generate"),
        Backend::Ooba | Backend::TabbyApi => Some("http://127.0.0.1:5000/v1/chat/completions"),
        Backend::Vllm => Some("http://127.0.0.1:8000/v1/chat/completions"),
        Backend::Ollama => Some("http://127.0.0.1:11434/v1/chat/completions"),
        Backend::CustomOpenAi => None,
    }
}

pub fn default_model(backend: Backend) -> Option<&'static str> {
    match backend {
        Backend::OpenAi | Backend::CustomOpenAi => Some("gpt-4o"),
        Backend::Anthropic => Some("claude-3-5-sonnet-20240620"),
        Backend::Cohere => Some("command-r-plus"),
        Backend::Groq => Some("llama3-70b-8192"),
        Backend::OpenRouter => Some("mistralai/mistral-7b-instruct:free"),
        Backend::HuggingFace => Some("meta-llama/Meta-Llama-3.1-8B-Instruct"),
        Backend::DeepSeek => Some("deepseek-chat"),
        Backend::Mistral => Some("mistral-large-latest"),
        Backend::TabbyApi => Some("tabby"),
        Backend::Ollama => Some("llama3"),
        Backend::LocalLlm | Backend::LlamaCpp | Backend::Kobold | Backend::Ooba | Backend::Vllm => None,
    }
}

pub fn api_key_env(backend: Backend) -> Option<&'static str> {
    match backend {
        Backend::OpenAi => Some("OPENAI_API_KEY"),
        Backend::Anthropic => Some("ANTHROPIC_API_KEY"),
        Backend::Cohere => Some("COHERE_API_KEY"),
        Backend::Groq => Some("GROQ_API_KEY"),
        Backend::OpenRouter => Some("OPENROUTER_API_KEY"),
        Backend::HuggingFace => Some("HUGGINGFACE_API_KEY"),
        Backend::DeepSeek => Some("DEEPSEEK_API_KEY"),
        Backend::Mistral => Some("MISTRAL_API_KEY"),
        Backend::CustomOpenAi => Some("CUSTOM_OPENAI_API_KEY"),
        _ => None,
    }
}
