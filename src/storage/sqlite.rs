//! SQLite session store implementation.
//!
//! One file, one connection, two record families: sessions and their
//! append-only event logs. Composite writes run inside IMMEDIATE
//! transactions so callers never observe partial state.

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::model::{NewSession, Session, SessionEvent, SessionPatch};
use crate::storage::schema::apply_schema;
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Durable session/event store over a single SQLite file.
///
/// The connection is owned by the instance and opened lazily: constructing a
/// store never touches the filesystem, and every operation first ensures the
/// `Ready` state (directory created, database opened, schema applied). After
/// [`SessionStore::close`] the next operation transparently re-initializes.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    conn: Option<Connection>,
}

impl SessionStore {
    /// Create a store for the resolved database location without opening it.
    ///
    /// `path` falls back to `RECALL_DB` and then `~/.recall/data/recall.db`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no location can be determined.
    pub fn new(path: Option<&Path>) -> Result<Self> {
        let path = resolve_db_path(path)
            .ok_or_else(|| Error::Config("cannot determine a database path".to_string()))?;
        Ok(Self { path, conn: None })
    }

    /// Create and eagerly initialize a store.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no location can be determined, or an
    /// init error if the directory or database file is unavailable.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let mut store = Self::new(path)?;
        store.ready()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(|source| Error::OpenDatabase {
            path: path.clone(),
            source,
        })?;
        apply_schema(&conn).map_err(|source| Error::OpenDatabase {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            conn: Some(conn),
        })
    }

    /// The resolved database path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the underlying file handle.
    ///
    /// Safe to call when already closed or never opened. A later operation
    /// lazily re-initializes the store.
    pub fn close(&mut self) {
        self.conn = None;
    }

    /// Ensure the `Ready` state: directory present, database open, schema
    /// applied. Idempotent; only the first call per open cycle does work.
    fn ready(&mut self) -> Result<&mut Connection> {
        if self.conn.is_none() {
            self.conn = Some(open_connection(&self.path)?);
        }
        match self.conn.as_mut() {
            Some(conn) => Ok(conn),
            None => unreachable!("connection initialized above"),
        }
    }

    /// Run a write operation inside an IMMEDIATE transaction.
    ///
    /// Engine failures are wrapped with the operation name; the transaction
    /// is rolled back when the closure fails.
    fn mutate<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&Transaction) -> Result<T>,
    ) -> Result<T> {
        let conn = self.ready()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|source| Error::Storage { op, source })?;
        let result = f(&tx).map_err(|e| e.in_op(op))?;
        tx.commit().map_err(|source| Error::Storage { op, source })?;
        Ok(result)
    }

    /// Run a read operation, wrapping engine failures with the operation name.
    fn query<T>(&mut self, op: &'static str, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.ready()?;
        f(conn).map_err(|e| e.in_op(op))
    }

    // ==================
    // Session Operations
    // ==================

    /// Create a new session.
    ///
    /// `created_at`/`updated_at` default to the current time. Returns the
    /// fully populated record with defaults applied.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateSession` if the id already exists.
    pub fn create_session(&mut self, new: NewSession) -> Result<Session> {
        let now = now_ms();
        let created_at = new.created_at.unwrap_or(now);
        let updated_at = new.updated_at.unwrap_or(created_at);
        let tags_json = encode_tags(new.tags.as_deref())?;

        self.mutate("create_session", |tx| {
            let result = tx.execute(
                "INSERT INTO sessions (id, createdAt, updatedAt, name, workingDirectory, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    new.id,
                    created_at,
                    updated_at,
                    new.name,
                    new.working_directory,
                    tags_json
                ],
            );

            match result {
                Ok(_) => Ok(()),
                Err(rusqlite::Error::SqliteFailure(err, _))
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Err(Error::DuplicateSession {
                        id: new.id.clone(),
                    })
                }
                Err(e) => Err(e.into()),
            }
        })?;

        Ok(Session {
            id: new.id,
            created_at,
            updated_at,
            name: new.name,
            working_directory: new.working_directory,
            tags: new.tags,
        })
    }

    /// Get a session by id.
    ///
    /// Absence is a normal outcome for existence probes, so a missing id
    /// yields `Ok(None)` rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_session(&mut self, id: &str) -> Result<Option<Session>> {
        self.query("get_session", |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, createdAt, updatedAt, name, workingDirectory, tags
                 FROM sessions WHERE id = ?1",
            )?;
            Ok(stmt.query_row([id], map_session_row).optional()?)
        })
    }

    /// List every session, most recently active first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_sessions(&mut self) -> Result<Vec<Session>> {
        self.query("list_sessions", |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, createdAt, updatedAt, name, workingDirectory, tags
                 FROM sessions ORDER BY updatedAt DESC",
            )?;
            let rows = stmt.query_map([], map_session_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    /// Apply a sparse metadata update.
    ///
    /// Only fields present in the patch change; `updated_at` always advances,
    /// even for an empty patch. Returns the merged record.
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionNotFound` if the id does not exist.
    pub fn update_session(&mut self, id: &str, patch: &SessionPatch) -> Result<Session> {
        let now = now_ms();
        let tags_json = encode_tags(patch.tags.as_deref())?;

        self.mutate("update_session", |tx| {
            let current = tx
                .query_row(
                    "SELECT id, createdAt, updatedAt, name, workingDirectory, tags
                     FROM sessions WHERE id = ?1",
                    [id],
                    map_session_row,
                )
                .optional()?
                .ok_or_else(|| Error::SessionNotFound { id: id.to_string() })?;

            // Build the SET clause from the fields actually present
            let mut set_clauses = vec!["updatedAt = ?"];
            let mut sql_params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(now)];

            if let Some(name) = &patch.name {
                set_clauses.push("name = ?");
                sql_params.push(Box::new(name.clone()));
            }
            if let Some(dir) = &patch.working_directory {
                set_clauses.push("workingDirectory = ?");
                sql_params.push(Box::new(dir.clone()));
            }
            if let Some(tags) = &tags_json {
                set_clauses.push("tags = ?");
                sql_params.push(Box::new(tags.clone()));
            }

            let sql = format!(
                "UPDATE sessions SET {} WHERE id = ?",
                set_clauses.join(", ")
            );
            sql_params.push(Box::new(id.to_string()));

            let param_refs: Vec<&dyn rusqlite::ToSql> =
                sql_params.iter().map(|p| p.as_ref()).collect();
            tx.execute(&sql, param_refs.as_slice())?;

            Ok(Session {
                id: current.id,
                created_at: current.created_at,
                updated_at: now,
                name: patch.name.clone().or(current.name),
                working_directory: patch
                    .working_directory
                    .clone()
                    .unwrap_or(current.working_directory),
                tags: patch.tags.clone().or(current.tags),
            })
        })
    }

    /// Delete a session and, atomically, all its events.
    ///
    /// Returns `true` if a session was removed, `false` for an unknown id —
    /// deletion is idempotent, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_session(&mut self, id: &str) -> Result<bool> {
        self.mutate("delete_session", |tx| {
            // Events go with the session via ON DELETE CASCADE
            let rows = tx.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
            Ok(rows > 0)
        })
    }

    // ================
    // Event Operations
    // ================

    /// Append an event to a session's log.
    ///
    /// The event insert and the parent's `updated_at` bump are one
    /// transactional unit; both carry the same timestamp.
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionNotFound` if the session does not exist —
    /// an event is never silently orphaned.
    pub fn append_event(
        &mut self,
        session_id: &str,
        payload: serde_json::Value,
    ) -> Result<SessionEvent> {
        let now = now_ms();
        let encoded = serde_json::to_string(&payload)?;

        let id = self.mutate("append_event", |tx| {
            if !session_exists(tx, session_id)? {
                return Err(Error::SessionNotFound {
                    id: session_id.to_string(),
                });
            }

            tx.execute(
                "INSERT INTO events (sessionId, timestamp, eventData) VALUES (?1, ?2, ?3)",
                params![session_id, now, encoded],
            )?;
            let id = tx.last_insert_rowid();

            tx.execute(
                "UPDATE sessions SET updatedAt = ?1 WHERE id = ?2",
                params![now, session_id],
            )?;

            Ok(id)
        })?;

        Ok(SessionEvent {
            id,
            session_id: session_id.to_string(),
            timestamp: now,
            event_data: payload,
        })
    }

    /// Read a session's full event log in replay order
    /// (`timestamp` ascending, `id` ascending).
    ///
    /// Each stored payload is decoded independently; a record whose payload
    /// no longer parses is replaced by a system-notice placeholder rather
    /// than failing the whole read.
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionNotFound` if the session does not exist —
    /// a missing session is never masked as an empty log.
    pub fn get_session_events(&mut self, session_id: &str) -> Result<Vec<SessionEvent>> {
        self.query("get_session_events", |conn| {
            if !session_exists(conn, session_id)? {
                return Err(Error::SessionNotFound {
                    id: session_id.to_string(),
                });
            }

            let mut stmt = conn.prepare(
                "SELECT id, timestamp, eventData FROM events
                 WHERE sessionId = ?1 ORDER BY timestamp ASC, id ASC",
            )?;
            let rows = stmt.query_map([session_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;

            let mut events = Vec::new();
            for row in rows {
                let (id, timestamp, raw) = row?;
                events.push(decode_event(id, session_id, timestamp, &raw));
            }
            Ok(events)
        })
    }
}

/// Current time in milliseconds since epoch.
fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Open, configure, and prepare the database at `path`.
fn open_connection(path: &Path) -> Result<Connection> {
    if path != Path::new(":memory:") {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|source| Error::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }
    }

    let open_err = |source| Error::OpenDatabase {
        path: path.to_path_buf(),
        source,
    };

    let conn = Connection::open(path).map_err(open_err)?;
    conn.busy_timeout(Duration::from_secs(5)).map_err(open_err)?;
    apply_schema(&conn).map_err(open_err)?;
    Ok(conn)
}

fn session_exists(conn: &Connection, id: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM sessions WHERE id = ?1")?;
    Ok(stmt.exists([id])?)
}

fn encode_tags(tags: Option<&[String]>) -> Result<Option<String>> {
    tags.map(|t| serde_json::to_string(t))
        .transpose()
        .map_err(Error::from)
}

fn map_session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    let tags: Option<String> = row.get(5)?;
    Ok(Session {
        id: row.get(0)?,
        created_at: row.get(1)?,
        updated_at: row.get(2)?,
        name: row.get(3)?,
        working_directory: row.get(4)?,
        tags: tags.map(|t| serde_json::from_str(&t).unwrap_or_default()),
    })
}

/// Decode one stored payload, downgrading a corrupt record to a placeholder.
fn decode_event(id: i64, session_id: &str, timestamp: i64, raw: &str) -> SessionEvent {
    match serde_json::from_str(raw) {
        Ok(event_data) => SessionEvent {
            id,
            session_id: session_id.to_string(),
            timestamp,
            event_data,
        },
        Err(err) => {
            tracing::warn!(
                event_id = id,
                session_id,
                error = %err,
                "replacing undecodable event payload with a placeholder"
            );
            SessionEvent {
                id,
                session_id: session_id.to_string(),
                timestamp: now_ms(),
                event_data: serde_json::json!({
                    "type": "system",
                    "message": format!("event {id} could not be decoded and was replaced: {err}"),
                }),
            }
        }
    }
}
