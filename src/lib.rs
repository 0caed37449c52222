// HTTP server modules
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sse;

// Conversation store
pub mod store;

// LLM abstraction layer
pub mod llm;
