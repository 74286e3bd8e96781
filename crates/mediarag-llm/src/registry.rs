//! Build the backend registry from the `[generation]` config table.

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

use mediarag_core::config::Config;
use mediarag_core::traits::GenerationBackend;
use mediarag_core::{Backend, BackendRegistry, Error};

use crate::anthropic::{AnthropicMessages, ANTHROPIC_VERSION};
use crate::chat::{OllamaChat, OpenAiChat};
use crate::cohere::CohereChat;
use crate::completion::{KoboldGenerate, LlamaCppCompletion};
use crate::error::{LlmError, LlmResult};
use crate::http::{bearer_headers, insert_header, JsonClient};
use crate::settings::BackendSettings;

pub const GENERATION_SECTION: &str = "generation";

/// Construct the adapter serving `backend`.
pub fn build_adapter(backend: Backend, settings: &BackendSettings) -> LlmResult<Box<dyn GenerationBackend>> {
    let url = settings
        .resolved_url(backend)
        .ok_or_else(|| LlmError::Config(format!("{backend}: no url configured")))?;
    let api_key = settings.resolved_api_key(backend);
    if api_key.is_none() && !backend.is_local() {
        warn!(%backend, "no API key configured");
    }
    let model = settings.resolved_model(backend);
    let system_prompt = settings.system_prompt().to_string();
    let timeout = settings.timeout_secs;

    let adapter: Box<dyn GenerationBackend> = match backend {
        Backend::Anthropic => {
            let mut headers = reqwest::header::HeaderMap::new();
            if let Some(key) = api_key.as_deref() {
                insert_header(&mut headers, "x-api-key", key)?;
            }
            insert_header(&mut headers, "anthropic-version", ANTHROPIC_VERSION)?;
            Box::new(AnthropicMessages {
                client: JsonClient::new(url, headers, timeout)?,
                model: model.ok_or_else(|| LlmError::Config(format!("{backend}: no model configured")))?,
                system_prompt,
                temperature: settings.temperature,
                max_tokens: settings.max_tokens,
            })
        }
        Backend::Cohere => Box::new(CohereChat {
            client: JsonClient::new(url, bearer_headers(api_key.as_deref())?, timeout)?,
            model: model.ok_or_else(|| LlmError::Config(format!("{backend}: no model configured")))?,
            system_prompt,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }),
        Backend::LlamaCpp => Box::new(LlamaCppCompletion {
            client: JsonClient::new(url, bearer_headers(api_key.as_deref())?, timeout)?,
            system_prompt,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }),
        Backend::Kobold => Box::new(KoboldGenerate {
            client: JsonClient::new(url, bearer_headers(api_key.as_deref())?, timeout)?,
            system_prompt,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }),
        Backend::Ollama => Box::new(OllamaChat {
            chat: OpenAiChat {
                client: JsonClient::new(url, bearer_headers(api_key.as_deref())?, timeout)?,
                model,
                system_prompt,
                temperature: settings.temperature,
                max_tokens: settings.max_tokens,
            },
            max_retries: settings.max_retries,
            retry_delay: Duration::from_secs(settings.retry_delay_secs),
        }),
        Backend::OpenAi
        | Backend::Groq
        | Backend::OpenRouter
        | Backend::HuggingFace
        | Backend::DeepSeek
        | Backend::Mistral
        | Backend::LocalLlm
        | Backend::Ooba
        | Backend::TabbyApi
        | Backend::Vllm
        | Backend::CustomOpenAi => Box::new(OpenAiChat {
            client: JsonClient::new(url, bearer_headers(api_key.as_deref())?, timeout)?,
            model,
            system_prompt,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }),
    };
    Ok(adapter)
}

/// One adapter per `[generation.<label>]` entry. Labels match backends
/// case-insensitively; an unknown label or unusable entry is a config error.
pub fn build_registry(config: &Config) -> mediarag_core::Result<BackendRegistry> {
    let sections: BTreeMap<String, BackendSettings> = config.section_or_default(GENERATION_SECTION)?;
    let mut registry = BackendRegistry::new();
    for (label, settings) in &sections {
        let backend: Backend = label
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("[{GENERATION_SECTION}.{label}]: unknown backend")))?;
        let adapter = build_adapter(backend, settings).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        registry.register(backend, adapter);
        info!(%backend, "registered generation backend");
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registers_each_configured_backend() {
        let config = Config::from_serialized(&json!({
            "generation": {
                "ollama": { "model": "llama3.1" },
                "llama_cpp": {},
                "Kobold": { "url": "http://10.0.0.2:5001/api/v1/generate" },
                "openai": { "api_key": "sk-test" }
            }
        }));
        let registry = build_registry(&config).unwrap();
        assert_eq!(registry.backends(), vec![Backend::OpenAi, Backend::LlamaCpp, Backend::Kobold, Backend::Ollama]);
        assert!(registry.get(Backend::Anthropic).is_none());
    }

    #[test]
    fn missing_section_gives_empty_registry() {
        let registry = build_registry(&Config::from_serialized(&json!({}))).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn unknown_label_is_invalid_config() {
        let config = Config::from_serialized(&json!({ "generation": { "bard": {} } }));
        assert!(matches!(build_registry(&config), Err(Error::InvalidConfig(m)) if m.contains("bard")));
    }

    #[test]
    fn custom_api_needs_a_url() {
        let err = build_adapter(Backend::CustomOpenAi, &BackendSettings::default());
        assert!(matches!(err, Err(LlmError::Config(_))));
        let ok = build_adapter(
            Backend::CustomOpenAi,
            &BackendSettings { url: Some("http://localhost:9000/v1/chat/completions".into()), ..BackendSettings::default() },
        );
        assert!(ok.is_ok());
    }
}
