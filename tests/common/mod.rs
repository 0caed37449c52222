//! Mock LLM providers for route-level tests

use async_trait::async_trait;

use chat_relay::llm::{
    EventStream, FinishReason, GenerateRequest, LlmError, LlmProvider, StreamEvent,
};

/// Provider that streams a fixed sequence of text fragments, then finishes
pub struct ScriptedProvider {
    chunks: Vec<String>,
}

impl ScriptedProvider {
    pub fn new(chunks: Vec<&str>) -> Self {
        Self {
            chunks: chunks.into_iter().map(String::from).collect(),
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn stream_generate(&self, _request: GenerateRequest) -> Result<EventStream, LlmError> {
        let mut events: Vec<Result<StreamEvent, LlmError>> = self
            .chunks
            .iter()
            .cloned()
            .map(|text| Ok(StreamEvent::TextDelta { text }))
            .collect();
        events.push(Ok(StreamEvent::Done {
            finish_reason: Some(FinishReason::Stop),
        }));

        Ok(Box::pin(futures::stream::iter(events)))
    }
}

/// Provider that fails before producing any content, like a missing or
/// rejected credential
pub struct FailingProvider;

#[async_trait]
impl LlmProvider for FailingProvider {
    async fn stream_generate(&self, _request: GenerateRequest) -> Result<EventStream, LlmError> {
        Err(LlmError::HttpError {
            status: 401,
            body: "Invalid API Key".to_string(),
        })
    }
}

/// Provider whose stream dies after one fragment
pub struct InterruptedProvider {
    prefix: String,
}

impl InterruptedProvider {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

#[async_trait]
impl LlmProvider for InterruptedProvider {
    async fn stream_generate(&self, _request: GenerateRequest) -> Result<EventStream, LlmError> {
        let events: Vec<Result<StreamEvent, LlmError>> = vec![
            Ok(StreamEvent::TextDelta {
                text: self.prefix.clone(),
            }),
            Err(LlmError::StreamError("connection reset".to_string())),
        ];

        Ok(Box::pin(futures::stream::iter(events)))
    }
}
