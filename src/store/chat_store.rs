//! SQLite-backed conversation store
//!
//! A single embedded database file holds every conversation and message. The
//! connection lives behind a mutex and every operation runs on the blocking
//! thread pool, so callers get a uniform async result-returning interface
//! while SQLite serializes conflicting writes underneath.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::models::{Conversation, Role, StoredMessage};
use crate::store::error::{Result, StoreError};
use crate::store::schema;

/// Handle to the conversation store, cheap to clone
#[derive(Clone)]
pub struct ChatStore {
    conn: Arc<Mutex<Connection>>,
}

impl ChatStore {
    /// Open (or create) the database at `path` and apply migrations
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        schema::run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        schema::run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool
    async fn with_conn<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            op(&mut conn)
        })
        .await?
    }

    /// Create a conversation and return its id
    pub async fn create_conversation(&self, title: &str) -> Result<i64> {
        let title = title.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO conversations (title, created_at) VALUES (?1, ?2)",
                params![title, now_timestamp()],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// List all conversations, newest first
    pub async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, created_at FROM conversations
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(Conversation {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    created_at: parse_timestamp(2, row.get(2)?)?,
                })
            })?;

            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(StoreError::from)
        })
        .await
    }

    /// List a conversation's messages, oldest first
    pub async fn get_messages(&self, conversation_id: i64) -> Result<Vec<StoredMessage>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, role, content, created_at FROM messages
                 WHERE conversation_id = ?1
                 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt.query_map(params![conversation_id], |row| {
                let tag: String = row.get(2)?;
                Ok(RawMessage {
                    id: row.get(0)?,
                    conversation_id: row.get(1)?,
                    role: tag,
                    content: row.get(3)?,
                    created_at: parse_timestamp(4, row.get(4)?)?,
                })
            })?;

            rows.collect::<rusqlite::Result<Vec<_>>>()?
                .into_iter()
                .map(RawMessage::into_stored)
                .collect()
        })
        .await
    }

    /// Append a message to a conversation and return its id
    ///
    /// Fails if the conversation does not exist (foreign key enforcement).
    pub async fn append_message(
        &self,
        conversation_id: i64,
        role: Role,
        content: &str,
    ) -> Result<i64> {
        let content = content.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO messages (conversation_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![conversation_id, role.as_str(), content, now_timestamp()],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Delete a conversation and all of its messages as one transaction
    pub async fn delete_conversation(&self, conversation_id: i64) -> Result<()> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM messages WHERE conversation_id = ?1",
                params![conversation_id],
            )?;
            tx.execute(
                "DELETE FROM conversations WHERE id = ?1",
                params![conversation_id],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }
}

/// Row shape before the role tag has been validated
struct RawMessage {
    id: i64,
    conversation_id: i64,
    role: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl RawMessage {
    fn into_stored(self) -> Result<StoredMessage> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| StoreError::Validation(format!("unknown role '{}'", self.role)))?;
        Ok(StoredMessage {
            id: self.id,
            conversation_id: self.conversation_id,
            role,
            content: self.content,
            created_at: self.created_at,
        })
    }
}

/// Current time as the stored RFC 3339 text, microsecond precision
fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
