//! Groq-specific request and response types
//!
//! These types map directly to Groq's OpenAI-compatible chat completions
//! schema.

use serde::{Deserialize, Serialize};

/// Request body for POST /openai/v1/chat/completions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model identifier (e.g. "llama-3.1-70b-versatile")
    pub model: String,
    /// Conversation history, oldest first
    pub messages: Vec<GroqMessage>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature (0.0-2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Top-p nucleus sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Stop sequences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Always true for streaming
    pub stream: bool,
}

/// A single message in the Groq conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqMessage {
    /// Role: "user" or "assistant"
    pub role: String,
    /// Text content
    pub content: String,
}

/// One streamed chunk of a chat completion
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    /// Completion identifier, stable across chunks
    pub id: String,
    /// Model that produced the chunk
    #[serde(default)]
    pub model: Option<String>,
    /// Incremental choice updates (one choice for this API usage)
    pub choices: Vec<ChunkChoice>,
}

/// Incremental update for one choice
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    /// Choice index
    pub index: u32,
    /// The incremental delta
    pub delta: ChunkDelta,
    /// Set on the final chunk for this choice
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Delta fields; all optional, the first chunk usually carries only the role
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Error body returned on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct GroqErrorResponse {
    pub error: GroqErrorData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroqErrorData {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// One parsed SSE frame from the Groq stream
#[derive(Debug, Clone)]
pub enum GroqStreamEvent {
    /// A completion chunk
    Chunk(ChatCompletionChunk),
    /// The `[DONE]` sentinel terminating the stream
    Done,
}
