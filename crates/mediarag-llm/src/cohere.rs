use serde_json::Value;

use mediarag_core::traits::GenerationBackend;

use crate::chat::chat_request;
use crate::error::{LlmError, LlmResult};
use crate::http::{text_at, JsonClient};

/// `message.content[0].text` of a v2 chat response.
pub fn parse_cohere_response(body: &Value) -> LlmResult<String> {
    text_at(body, "/message/content/0/text")
        .or_else(|| text_at(body, "/text"))
        .ok_or_else(|| LlmError::Response(format!("no text in Cohere response: {body}")))
}

/// Cohere v2 chat. The request body matches the OpenAI chat shape.
#[derive(Debug)]
pub struct CohereChat {
    pub(crate) client: JsonClient,
    pub(crate) model: String,
    pub(crate) system_prompt: String,
    pub(crate) temperature: Option<f32>,
    pub(crate) max_tokens: Option<u32>,
}

impl GenerationBackend for CohereChat {
    fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let request = chat_request(Some(&self.model), &self.system_prompt, prompt, self.temperature, self.max_tokens);
        Ok(parse_cohere_response(&self.client.post(&request)?)?)
    }
}
