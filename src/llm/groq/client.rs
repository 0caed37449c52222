//! Groq client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;

use crate::llm::core::{
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::GenerateRequest,
};

use super::mapper::{from_groq_event, to_groq_request};
use super::sse::parse_sse_stream;
use super::types::GroqErrorResponse;

/// Default model, a large-context model suited to long outputs
pub const DEFAULT_MODEL: &str = "llama-3.1-70b-versatile";

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com";

/// Placeholder credential used when no API key is configured; every request
/// fails authentication, which routes chat turns through the fallback path.
pub const DEMO_API_KEY: &str = "demo-key";

/// Configuration for the Groq client
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// Bearer credential
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// API base URL (overridable for tests)
    pub base_url: String,
}

impl GroqConfig {
    /// Configuration for the given API key with default model and endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Client for streaming chat completions from Groq
pub struct GroqClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Client configuration (credential, model, endpoint)
    config: GroqConfig,
}

impl GroqClient {
    /// Create a new Groq client
    ///
    /// The read timeout bounds how long the stream may sit idle between
    /// chunks, so a hung upstream cannot hang the relay forever.
    pub fn new(config: GroqConfig) -> Result<Self, LlmError> {
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .read_timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| LlmError::HttpError {
                status: 0,
                body: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Build the chat completions endpoint URL
    fn build_endpoint_url(&self) -> String {
        format!(
            "{}/openai/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Make a streaming request to Groq
    async fn make_streaming_request(
        &self,
        request: GenerateRequest,
    ) -> Result<EventStream, LlmError> {
        // Convert to Groq request format
        let groq_request = to_groq_request(&self.config.model, request);

        // Build request
        let url = self.build_endpoint_url();
        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&groq_request)
            .send()
            .await?;

        // Check status
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());

            // Prefer the structured error body when it parses
            if let Ok(parsed) = serde_json::from_str::<GroqErrorResponse>(&body) {
                return Err(LlmError::ProviderError {
                    code: parsed.error.code.unwrap_or(parsed.error.error_type),
                    message: parsed.error.message,
                });
            }

            return Err(LlmError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        // Parse SSE stream and convert to StreamEvent stream
        let byte_stream = response.bytes_stream();
        let sse_stream = parse_sse_stream(Box::pin(byte_stream));

        let event_stream = sse_stream.flat_map(|result| match result {
            Ok(groq_event) => futures::stream::iter(
                from_groq_event(groq_event)
                    .into_iter()
                    .map(Ok)
                    .collect::<Vec<_>>(),
            ),
            Err(e) => futures::stream::iter(vec![Err(e)]),
        });

        Ok(Box::pin(event_stream))
    }
}

#[async_trait]
impl LlmProvider for GroqClient {
    async fn stream_generate(&self, request: GenerateRequest) -> Result<EventStream, LlmError> {
        self.make_streaming_request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GroqConfig::new("gsk_test");
        assert_eq!(config.api_key, "gsk_test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_config_builder() {
        let config = GroqConfig::new("gsk_test")
            .with_model("llama-3.3-70b-versatile")
            .with_base_url("http://127.0.0.1:9999");
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.base_url, "http://127.0.0.1:9999");
    }

    #[test]
    fn test_endpoint_url_format() {
        let client = GroqClient::new(GroqConfig::new("gsk_test")).unwrap();
        assert_eq!(
            client.build_endpoint_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );

        let client =
            GroqClient::new(GroqConfig::new("gsk_test").with_base_url("http://localhost:9999/"))
                .unwrap();
        assert_eq!(
            client.build_endpoint_url(),
            "http://localhost:9999/openai/v1/chat/completions"
        );
    }
}
