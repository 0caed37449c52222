//! Idempotent schema migration for the conversation store
//!
//! Runs once when the store is opened, separate from query logic. Every
//! statement is `IF NOT EXISTS` so reopening an existing database is a no-op.

use rusqlite::Connection;

use crate::store::error::Result;

/// Apply the schema to a freshly opened connection
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Enforced so messages cannot reference a missing conversation
    conn.pragma_update(None, "foreign_keys", true)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS conversations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id INTEGER NOT NULL,
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (conversation_id) REFERENCES conversations(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_messages_conversation
         ON messages(conversation_id, created_at)",
        [],
    )?;

    Ok(())
}
