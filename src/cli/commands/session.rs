//! Session command implementations.

use crate::cli::SessionCommands;
use crate::error::Result;
use crate::model::{NewSession, Session, SessionPatch};
use crate::storage::SessionStore;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

/// Output for the session list command.
#[derive(Serialize)]
struct SessionListOutput {
    sessions: Vec<Session>,
    count: usize,
}

/// Execute session commands.
///
/// # Errors
///
/// Returns an error if the store operation fails.
pub fn execute(command: &SessionCommands, db_path: Option<&Path>, json: bool) -> Result<()> {
    let mut store = SessionStore::new(db_path)?;

    match command {
        SessionCommands::Create {
            working_directory,
            id,
            name,
            tags,
        } => create(
            &mut store,
            working_directory,
            id.as_deref(),
            name.as_deref(),
            tags,
            json,
        ),
        SessionCommands::List => list(&mut store, json),
        SessionCommands::Show { id } => show(&mut store, id, json),
        SessionCommands::Update {
            id,
            name,
            working_directory,
            tags,
        } => update(
            &mut store,
            id,
            name.as_deref(),
            working_directory.as_deref(),
            tags,
            json,
        ),
        SessionCommands::Delete { id } => delete(&mut store, id, json),
    }
}

fn create(
    store: &mut SessionStore,
    working_directory: &str,
    id: Option<&str>,
    name: Option<&str>,
    tags: &[String],
    json: bool,
) -> Result<()> {
    let id = id.map_or_else(generate_session_id, ToString::to_string);

    let session = store.create_session(NewSession {
        name: name.map(ToString::to_string),
        tags: if tags.is_empty() {
            None
        } else {
            Some(tags.to_vec())
        },
        ..NewSession::new(id, working_directory)
    })?;

    if json {
        println!("{}", serde_json::to_string(&session)?);
    } else {
        println!("{} {}", "Created session:".green(), session.id.bold());
    }

    Ok(())
}

fn list(store: &mut SessionStore, json: bool) -> Result<()> {
    let sessions = store.list_sessions()?;

    if json {
        let output = SessionListOutput {
            count: sessions.len(),
            sessions,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if sessions.is_empty() {
        println!("No sessions stored.");
    } else {
        for s in &sessions {
            let label = s.name.as_deref().unwrap_or("-");
            println!(
                "{}  {}  {}  {}",
                s.id.bold(),
                label,
                s.working_directory,
                format_ts(s.updated_at).dimmed()
            );
        }
    }

    Ok(())
}

fn show(store: &mut SessionStore, id: &str, json: bool) -> Result<()> {
    let session = store
        .get_session(id)?
        .ok_or_else(|| crate::error::Error::SessionNotFound { id: id.to_string() })?;

    print_session(&session, json)
}

fn update(
    store: &mut SessionStore,
    id: &str,
    name: Option<&str>,
    working_directory: Option<&str>,
    tags: &[String],
    json: bool,
) -> Result<()> {
    let patch = SessionPatch {
        name: name.map(ToString::to_string),
        working_directory: working_directory.map(ToString::to_string),
        tags: if tags.is_empty() {
            None
        } else {
            Some(tags.to_vec())
        },
    };

    let session = store.update_session(id, &patch)?;
    print_session(&session, json)
}

fn delete(store: &mut SessionStore, id: &str, json: bool) -> Result<()> {
    // Idempotent: deleting an unknown id reports deleted=false, not an error
    let deleted = store.delete_session(id)?;

    if json {
        println!("{}", serde_json::json!({ "id": id, "deleted": deleted }));
    } else if deleted {
        println!("{} {}", "Deleted session:".green(), id.bold());
    } else {
        println!("No session with ID {id}.");
    }

    Ok(())
}

fn print_session(session: &Session, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(session)?);
    } else {
        println!("{}        {}", "id:".dimmed(), session.id.bold());
        println!(
            "{}      {}",
            "name:".dimmed(),
            session.name.as_deref().unwrap_or("-")
        );
        println!("{}   {}", "workdir:".dimmed(), session.working_directory);
        if let Some(tags) = &session.tags {
            println!("{}      {}", "tags:".dimmed(), tags.join(", "));
        }
        println!(
            "{}   {}",
            "created:".dimmed(),
            format_ts(session.created_at)
        );
        println!(
            "{}   {}",
            "updated:".dimmed(),
            format_ts(session.updated_at)
        );
    }

    Ok(())
}

fn generate_session_id() -> String {
    format!("sess_{}", &uuid::Uuid::new_v4().to_string()[..8])
}

fn format_ts(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map_or_else(|| ms.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}
