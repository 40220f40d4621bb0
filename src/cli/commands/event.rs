//! Event command implementations.

use crate::cli::EventCommands;
use crate::error::Result;
use crate::model::SessionEvent;
use crate::storage::SessionStore;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;

/// Output for the event list command.
#[derive(Serialize)]
struct EventListOutput {
    events: Vec<SessionEvent>,
    count: usize,
}

/// Execute event commands.
///
/// # Errors
///
/// Returns an error if the payload is not valid JSON or the store
/// operation fails.
pub fn execute(command: &EventCommands, db_path: Option<&Path>, json: bool) -> Result<()> {
    let mut store = SessionStore::new(db_path)?;

    match command {
        EventCommands::Append { session_id, data } => append(&mut store, session_id, data, json),
        EventCommands::List { session_id } => list(&mut store, session_id, json),
    }
}

fn append(store: &mut SessionStore, session_id: &str, data: &str, json: bool) -> Result<()> {
    let payload: serde_json::Value = serde_json::from_str(data)?;
    let event = store.append_event(session_id, payload)?;

    if json {
        println!("{}", serde_json::to_string(&event)?);
    } else {
        println!(
            "{} {} {} {}",
            "Appended event".green(),
            event.id.to_string().bold(),
            "to".green(),
            session_id.bold()
        );
    }

    Ok(())
}

fn list(store: &mut SessionStore, session_id: &str, json: bool) -> Result<()> {
    let events = store.get_session_events(session_id)?;

    if json {
        let output = EventListOutput {
            count: events.len(),
            events,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else if events.is_empty() {
        println!("No events for session {session_id}.");
    } else {
        for e in &events {
            println!(
                "{}  {}  {}",
                e.id.to_string().bold(),
                e.timestamp.to_string().dimmed(),
                serde_json::to_string(&e.event_data)?
            );
        }
    }

    Ok(())
}
