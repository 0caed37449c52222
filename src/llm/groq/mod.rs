//! Groq provider (OpenAI-compatible chat completions API)

pub mod client;
pub mod mapper;
pub mod sse;
pub mod types;

pub use client::{GroqClient, GroqConfig, DEFAULT_MODEL, DEMO_API_KEY};
