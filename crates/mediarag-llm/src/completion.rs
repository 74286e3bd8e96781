//! Raw-prompt completion servers: llama.cpp and KoboldCpp.

use serde::Serialize;
use serde_json::Value;

use mediarag_core::traits::GenerationBackend;

use crate::error::{LlmError, LlmResult};
use crate::http::{text_at, JsonClient};

const KOBOLD_MAX_CONTEXT_LENGTH: u32 = 8096;
const KOBOLD_MAX_LENGTH: u32 = 4096;
const KOBOLD_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
pub(crate) struct LlamaCppRequest<'a> {
    pub prompt: &'a str,
    pub system_prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_predict: Option<u32>,
    pub stream: bool,
}

pub fn parse_llama_cpp_response(body: &Value) -> LlmResult<String> {
    text_at(body, "/content").ok_or_else(|| LlmError::Response(format!("no content in llama.cpp response: {body}")))
}

#[derive(Debug)]
pub struct LlamaCppCompletion {
    pub(crate) client: JsonClient,
    pub(crate) system_prompt: String,
    pub(crate) temperature: Option<f32>,
    pub(crate) max_tokens: Option<u32>,
}

impl GenerationBackend for LlamaCppCompletion {
    fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let request = LlamaCppRequest {
            prompt,
            system_prompt: &self.system_prompt,
            temperature: self.temperature,
            n_predict: self.max_tokens,
            stream: false,
        };
        Ok(parse_llama_cpp_response(&self.client.post(&request)?)?)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct KoboldRequest {
    pub max_context_length: u32,
    pub max_length: u32,
    pub prompt: String,
    pub temperature: f32,
}

impl KoboldRequest {
    pub(crate) fn new(system_prompt: &str, prompt: &str, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        Self {
            max_context_length: KOBOLD_MAX_CONTEXT_LENGTH,
            max_length: max_tokens.unwrap_or(KOBOLD_MAX_LENGTH),
            prompt: format!("{system_prompt}\n\n{prompt}"),
            temperature: temperature.unwrap_or(KOBOLD_TEMPERATURE),
        }
    }
}

pub fn parse_kobold_response(body: &Value) -> LlmResult<String> {
    text_at(body, "/results/0/text").ok_or_else(|| LlmError::Response(format!("no results in Kobold response: {body}")))
}

#[derive(Debug)]
pub struct KoboldGenerate {
    pub(crate) client: JsonClient,
    pub(crate) system_prompt: String,
    pub(crate) temperature: Option<f32>,
    pub(crate) max_tokens: Option<u32>,
}

impl GenerationBackend for KoboldGenerate {
    fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let request = KoboldRequest::new(&self.system_prompt, prompt, self.temperature, self.max_tokens);
        Ok(parse_kobold_response(&self.client.post(&request)?)?)
    }
}
