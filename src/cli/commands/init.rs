//! Initialize the Recall database.
//!
//! Creates the store file (and its containing directory) at the resolved
//! location and applies the schema. Safe to run against an existing
//! database: initialization is idempotent.

use crate::error::Result;
use crate::storage::SessionStore;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct InitOutput {
    path: PathBuf,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns an error if the directory or database cannot be created.
pub fn execute(db_path: Option<&Path>, json: bool) -> Result<()> {
    let store = SessionStore::open(db_path)?;

    if json {
        let output = InitOutput {
            path: store.path().to_path_buf(),
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "{} {}",
            "Initialized store at".green(),
            store.path().display()
        );
    }

    Ok(())
}
