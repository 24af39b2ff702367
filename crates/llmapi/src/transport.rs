// HTTP transport for OpenAI-compatible `/chat/completions` endpoints (no SDK)

use crate::config::ClientConfig;
use crate::error::{LlmError, Result};
use crate::request::ChatRequest;
use crate::response::extract_error;
use crate::streaming::{parse_chat_sse_stream, EventStream};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

/// Sends a request document and returns the provider's answer.
///
/// The client holds exactly one transport; tests substitute their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a non-streaming request and return the parsed response body
    async fn send(&self, request: &ChatRequest) -> Result<Value>;

    /// Send a streaming request and return its events in receipt order
    async fn send_stream(&self, request: &ChatRequest) -> Result<EventStream>;
}

/// `reqwest`-backed transport with bearer authentication
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
            .map_err(|_| LlmError::invalid_argument("Invalid API key format"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url().as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn post(&self, request: &ChatRequest) -> Result<reqwest::Response> {
        let mut builder = self.http_client.post(self.endpoint()).json(request);
        if request.stream {
            builder = builder.header(ACCEPT, "text/event-stream");
        }

        // malformed URL -> InvalidArgument, connect/timeout -> Network
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|doc| extract_error(&doc))
                .unwrap_or(body);
            return Err(LlmError::network(format!("API error ({}): {}", status, detail)));
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<Value> {
        let response = self.post(request).await?;
        Ok(response.json::<Value>().await?)
    }

    async fn send_stream(&self, request: &ChatRequest) -> Result<EventStream> {
        let response = self.post(request).await?;
        Ok(parse_chat_sse_stream(response.bytes_stream()))
    }
}
