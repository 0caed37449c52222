//! Conversation persistence
//!
//! An embedded SQLite database mapping conversations to ordered message
//! lists. Pure CRUD; the only invariant is referential integrity (deleting a
//! conversation removes its messages).

pub mod chat_store;
pub mod error;
pub mod schema;

// Re-export main types for convenience
pub use chat_store::ChatStore;
pub use error::{Result, StoreError};
