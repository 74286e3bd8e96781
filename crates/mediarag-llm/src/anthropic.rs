use serde::Serialize;
use serde_json::Value;

use mediarag_core::traits::GenerationBackend;

use crate::chat::Message;
use crate::error::{LlmError, LlmResult};
use crate::http::JsonClient;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Serialize)]
pub(crate) struct MessagesRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub system: &'a str,
    pub messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Concatenated `text` blocks of a messages response.
pub fn parse_messages_response(body: &Value) -> LlmResult<String> {
    let text: String = body
        .get("content")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect();
    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::Response(format!("no text content in Anthropic response: {body}")));
    }
    Ok(text.to_string())
}

#[derive(Debug)]
pub struct AnthropicMessages {
    pub(crate) client: JsonClient,
    pub(crate) model: String,
    pub(crate) system_prompt: String,
    pub(crate) temperature: Option<f32>,
    pub(crate) max_tokens: Option<u32>,
}

impl AnthropicMessages {
    pub(crate) fn request<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: &self.system_prompt,
            messages: vec![Message { role: "user", content: prompt }],
            temperature: self.temperature,
        }
    }
}

impl GenerationBackend for AnthropicMessages {
    fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        Ok(parse_messages_response(&self.client.post(&self.request(prompt))?)?)
    }
}
