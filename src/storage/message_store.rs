use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, Result as SqlResult, params};
use uuid::Uuid;

use crate::common::Message;
use crate::error::ChatError;

struct StoreInner {
    conn: Connection,
    /// Last `created_at` handed out; appends clamp against it so a
    /// conversation's stored sequence never goes backwards across a clock step.
    last_created_at: i64,
}

/// Durable append-only record of messages between pairs of users.
///
/// One store is shared by every connection task; the interior mutex
/// serializes appends, which also makes insert order equal time order.
pub struct MessageStore {
    inner: Mutex<StoreInner>,
}

impl MessageStore {
    /// Open (or create) the store at `path` and initialize the schema.
    pub fn with_path<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// In-memory store, used by tests.
    pub fn in_memory() -> SqlResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> SqlResult<Self> {
        init_schema(&conn)?;
        Ok(Self {
            inner: Mutex::new(StoreInner {
                conn,
                last_created_at: 0,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Atomically persist one message, assigning its `id` and `created_at`.
    ///
    /// Fails with `ChatError::Persist` when the underlying database is
    /// unavailable; no partial record exists in that case.
    pub fn append(
        &self,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
    ) -> Result<Message, ChatError> {
        let mut inner = self.lock();

        let created_at = Utc::now().timestamp_millis().max(inner.last_created_at);
        let message = Message {
            id: Uuid::new_v4().to_string(),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            content: content.to_string(),
            created_at,
        };

        inner.conn.execute(
            "INSERT INTO messages (id, sender_id, receiver_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                message.id,
                message.sender_id,
                message.receiver_id,
                message.content,
                message.created_at
            ],
        )?;
        inner.last_created_at = created_at;

        Ok(message)
    }

    /// Ordered backlog for the unordered pair `{a, b}`, ascending by
    /// `created_at`. Each call is a fresh query, not a live cursor.
    pub fn history(&self, a: &str, b: &str) -> Result<Vec<Message>, ChatError> {
        let inner = self.lock();
        let mut stmt = inner.conn.prepare(
            "SELECT id, sender_id, receiver_id, content, created_at
             FROM messages
             WHERE (sender_id = ?1 AND receiver_id = ?2)
                OR (sender_id = ?2 AND receiver_id = ?1)
             ORDER BY created_at ASC, rowid ASC",
        )?;

        let messages = stmt
            .query_map(params![a, b], |row| {
                Ok(Message {
                    id: row.get(0)?,
                    sender_id: row.get(1)?,
                    receiver_id: row.get(2)?,
                    content: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(messages)
    }
}

fn init_schema(conn: &Connection) -> SqlResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            sender_id TEXT NOT NULL,
            receiver_id TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_messages_pair
         ON messages(sender_id, receiver_id, created_at)",
        [],
    )?;

    Ok(())
}
