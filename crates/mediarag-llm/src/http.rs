//! Blocking JSON POST client shared by every adapter.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{LlmError, LlmResult};

#[derive(Debug)]
pub struct JsonClient {
    client: Client,
    endpoint: String,
}

impl JsonClient {
    pub fn new(endpoint: String, headers: HeaderMap, timeout_secs: u64) -> LlmResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    /// POST `request` and decode the response body as JSON.
    pub fn post<T: Serialize>(&self, request: &T) -> LlmResult<Value> {
        let body = serde_json::to_vec(request).map_err(|e| LlmError::Request(format!("Failed to serialize request: {e}")))?;
        debug!(endpoint = %self.endpoint, bytes = body.len(), "sending generation request");

        // reqwest::blocking panics inside a tokio runtime, so send from a plain thread.
        let response = std::thread::scope(|s| {
            s.spawn(|| self.client.post(&self.endpoint).header(CONTENT_TYPE, "application/json").body(body).send())
                .join()
        })
        .map_err(|_| LlmError::Request("HTTP request thread panicked".to_string()))?
        .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        let text = response.text().map_err(|e| LlmError::Response(format!("Failed to read response body: {e}")))?;
        if !status.is_success() {
            return Err(LlmError::Status { status: status.as_u16(), body: text });
        }
        serde_json::from_str(&text).map_err(|e| LlmError::Response(format!("Failed to decode JSON response: {e}")))
    }
}

pub fn bearer_headers(api_key: Option<&str>) -> LlmResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(key) = api_key {
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {key}"))?);
    }
    Ok(headers)
}

pub fn insert_header(headers: &mut HeaderMap, name: &'static str, value: &str) -> LlmResult<()> {
    headers.insert(HeaderName::from_static(name), header_value(value)?);
    Ok(())
}

fn header_value(value: &str) -> LlmResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| LlmError::Config(format!("Invalid header value: {e}")))
}

/// First non-empty string at `pointer`, trimmed.
pub fn text_at(body: &Value, pointer: &str) -> Option<String> {
    body.pointer(pointer).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}
