//! LLM Abstraction Layer
//!
//! This module provides a unified streaming interface over upstream
//! completion providers; the concrete provider is Groq's OpenAI-compatible
//! chat completions API.

pub mod core;
pub mod groq;

// Re-export commonly used types
pub use self::core::{
    config::GenerationConfig,
    error::LlmError,
    provider::{EventStream, LlmProvider},
    types::{FinishReason, GenerateRequest, Message, MessageRole, StreamEvent},
};

pub use groq::{GroqClient, GroqConfig};
