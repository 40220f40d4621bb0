//! Configuration management.
//!
//! Recall uses a **global database** architecture: one SQLite file shared by
//! every consumer on the machine, at `~/.recall/data/recall.db`, unless the
//! caller supplies an explicit path or `RECALL_DB` points elsewhere.

use std::path::{Path, PathBuf};

/// Get the global Recall directory location.
///
/// Always `~/.recall/`, so the CLI and any embedding service share
/// the same database.
#[must_use]
pub fn global_recall_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".recall"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. Explicit path from the caller (CLI flag or store constructor)
/// 2. `RECALL_DB` environment variable
/// 3. Global location: `~/.recall/data/recall.db`
///
/// # Returns
///
/// Returns the path to the database file, or `None` if no location
/// can be determined (no home directory).
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Ok(db_path) = std::env::var("RECALL_DB") {
        if !db_path.trim().is_empty() {
            return Some(PathBuf::from(db_path));
        }
    }

    global_recall_dir().map(|dir| dir.join("data").join("recall.db"))
}
