//! Data models for Recall.
//!
//! This module contains the two record families the store persists:
//! - Session
//! - `SessionEvent`
//!
//! Event payloads are deliberately opaque: any JSON-like structure is
//! accepted and returned unchanged.

use serde::{Deserialize, Serialize};

/// A persisted conversation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique, caller-supplied identifier.
    pub id: String,

    /// Creation time in milliseconds since epoch.
    pub created_at: i64,

    /// Last activity time in milliseconds since epoch.
    /// Advanced by every metadata update and event append;
    /// always `>= created_at`.
    pub updated_at: i64,

    /// Optional display label.
    pub name: Option<String>,

    /// Execution context path for the session.
    pub working_directory: String,

    /// Optional ordered tags, persisted as a JSON text encoding.
    pub tags: Option<Vec<String>>,
}

/// Input for creating a session.
///
/// `created_at`/`updated_at` default to the current time when omitted.
#[derive(Debug, Clone, Default)]
pub struct NewSession {
    pub id: String,
    pub working_directory: String,
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

impl NewSession {
    /// Convenience constructor for the two required fields.
    #[must_use]
    pub fn new(id: impl Into<String>, working_directory: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            working_directory: working_directory.into(),
            ..Self::default()
        }
    }
}

/// Sparse metadata update: `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub name: Option<String>,
    pub working_directory: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl SessionPatch {
    /// Whether the patch carries any field at all.
    ///
    /// An empty patch still advances the session's `updated_at`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.working_directory.is_none() && self.tags.is_none()
    }
}

/// One immutable record in a session's event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    /// Auto-assigned sequence number, unique across the whole store.
    /// Tie-breaker for events sharing a millisecond timestamp.
    pub id: i64,

    /// Owning session.
    pub session_id: String,

    /// Insertion time in milliseconds since epoch.
    pub timestamp: i64,

    /// Opaque payload, stored as its JSON text encoding.
    pub event_data: serde_json::Value,
}
