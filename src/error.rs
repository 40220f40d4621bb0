//! Error types for Recall.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=store, 3=not_found, 4=conflict, etc.)
//! - Operation-name context on engine failures
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Recall operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Agents match on the string; shell scripts on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Store (exit 2)
    InitFailed,
    StorageError,

    // Not Found (exit 3)
    SessionNotFound,

    // Conflict (exit 4)
    DuplicateSession,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    JsonError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::InitFailed => "INIT_FAILED",
            Self::StorageError => "STORAGE_ERROR",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::DuplicateSession => "DUPLICATE_SESSION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::JsonError => "JSON_ERROR",
        }
    }

    /// Category-based exit code (2-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InitFailed | Self::StorageError => 2,
            Self::SessionNotFound => 3,
            Self::DuplicateSession => 4,
            Self::ConfigError => 7,
            Self::JsonError => 8,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Recall store operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The store directory could not be created. Fatal to the store instance.
    #[error("cannot create store directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The database file could not be opened or configured. Fatal.
    #[error("cannot open store database {}: {source}", path.display())]
    OpenDatabase {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("session not found: {id}")]
    SessionNotFound { id: String },

    #[error("session already exists: {id}")]
    DuplicateSession { id: String },

    /// Engine failure inside a named store operation.
    #[error("storage failure during {op}: {source}")]
    Storage {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// Engine failure before an operation boundary attached its name.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Attach an operation name to a bare engine failure.
    ///
    /// Typed variants already carry their target id and pass through.
    #[must_use]
    pub(crate) fn in_op(self, op: &'static str) -> Self {
        match self {
            Self::Database(source) => Self::Storage { op, source },
            other => other,
        }
    }

    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::CreateDir { .. } | Self::OpenDatabase { .. } => ErrorCode::InitFailed,
            Self::SessionNotFound { .. } => ErrorCode::SessionNotFound,
            Self::DuplicateSession { .. } => ErrorCode::DuplicateSession,
            Self::Storage { .. } | Self::Database(_) => ErrorCode::StorageError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for agents and humans.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::SessionNotFound { id } => Some(format!(
                "No session with ID '{id}'. Use `recall session list` to see stored sessions."
            )),
            Self::DuplicateSession { id } => Some(format!(
                "A session with ID '{id}' already exists. Pick another ID or omit --id to generate one."
            )),
            Self::Config(_) => {
                Some("Pass --db <path> or set RECALL_DB to choose a database location.".to_string())
            }
            _ => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, exit code, and optional recovery hint.
    /// Agents parse this instead of stderr text.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_op_wraps_engine_errors_only() {
        let err = Error::Database(rusqlite::Error::InvalidQuery).in_op("create_session");
        assert!(matches!(
            err,
            Error::Storage {
                op: "create_session",
                ..
            }
        ));

        let err = Error::SessionNotFound {
            id: "s1".to_string(),
        }
        .in_op("create_session");
        assert!(matches!(err, Error::SessionNotFound { .. }));
    }

    #[test]
    fn test_exit_codes_by_category() {
        let not_found = Error::SessionNotFound {
            id: "x".to_string(),
        };
        assert_eq!(not_found.exit_code(), 3);
        assert_eq!(not_found.error_code().as_str(), "SESSION_NOT_FOUND");

        let duplicate = Error::DuplicateSession {
            id: "x".to_string(),
        };
        assert_eq!(duplicate.exit_code(), 4);
    }

    #[test]
    fn test_structured_json_includes_hint() {
        let err = Error::SessionNotFound {
            id: "s9".to_string(),
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "SESSION_NOT_FOUND");
        assert!(
            json["error"]["hint"]
                .as_str()
                .is_some_and(|h| h.contains("s9"))
        );
    }
}
