//! OpenAI-compatible chat completions, plus Ollama's flavour of it.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

use mediarag_core::traits::GenerationBackend;

use crate::error::{LlmError, LlmResult};
use crate::http::{text_at, JsonClient};

#[derive(Debug, Serialize)]
pub(crate) struct Message<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

pub(crate) fn chat_request<'a>(
    model: Option<&'a str>,
    system_prompt: &'a str,
    prompt: &'a str,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![Message { role: "system", content: system_prompt }, Message { role: "user", content: prompt }],
        temperature,
        max_tokens,
        stream: false,
    }
}

/// `choices[0].message.content` of a chat completion.
pub fn parse_chat_response(body: &Value) -> LlmResult<String> {
    text_at(body, "/choices/0/message/content")
        .ok_or_else(|| LlmError::Response(format!("no message content in response: {body}")))
}

/// Any service speaking the OpenAI chat completions protocol.
#[derive(Debug)]
pub struct OpenAiChat {
    pub(crate) client: JsonClient,
    pub(crate) model: Option<String>,
    pub(crate) system_prompt: String,
    pub(crate) temperature: Option<f32>,
    pub(crate) max_tokens: Option<u32>,
}

impl OpenAiChat {
    pub fn chat(&self, prompt: &str) -> LlmResult<String> {
        let request = chat_request(self.model.as_deref(), &self.system_prompt, prompt, self.temperature, self.max_tokens);
        parse_chat_response(&self.client.post(&request)?)
    }
}

impl GenerationBackend for OpenAiChat {
    fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        Ok(self.chat(prompt)?)
    }
}

/// Outcome of one Ollama round trip.
#[derive(Debug, PartialEq, Eq)]
pub enum OllamaReply {
    Text(String),
    Loading,
}

pub fn parse_ollama_response(body: &Value) -> LlmResult<OllamaReply> {
    if let Some(text) = text_at(body, "/response") {
        return Ok(OllamaReply::Text(text));
    }
    if let Some(text) = text_at(body, "/choices/0/message/content") {
        return Ok(OllamaReply::Text(text));
    }
    let done_reason = body.get("done_reason").and_then(Value::as_str);
    if done_reason == Some("load") {
        return Ok(OllamaReply::Loading);
    }
    Err(LlmError::Response(format!("no response text from Ollama: {body}")))
}

/// Ollama chat endpoint. Retries with a fixed delay while the model loads.
#[derive(Debug)]
pub struct OllamaChat {
    pub(crate) chat: OpenAiChat,
    pub(crate) max_retries: u32,
    pub(crate) retry_delay: Duration,
}

impl GenerationBackend for OllamaChat {
    fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let inner = &self.chat;
        let request = chat_request(inner.model.as_deref(), &inner.system_prompt, prompt, inner.temperature, inner.max_tokens);
        let attempts = self.max_retries.max(1);
        for attempt in 1..=attempts {
            match parse_ollama_response(&inner.client.post(&request)?)? {
                OllamaReply::Text(text) => return Ok(text),
                OllamaReply::Loading => {
                    warn!(attempt, attempts, "ollama model is loading");
                    if attempt < attempts {
                        info!(delay_secs = self.retry_delay.as_secs(), "retrying ollama request");
                        std::thread::sleep(self.retry_delay);
                    }
                }
            }
        }
        Err(LlmError::ModelLoading { attempts }.into())
    }
}
