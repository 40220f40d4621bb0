//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

pub mod commands;

/// Recall - durable session and event storage for conversational agents
#[derive(Parser, Debug)]
#[command(name = "recall", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.recall/data/recall.db)
    #[arg(long, global = true, env = "RECALL_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON (for agent integration)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the store database
    Init,

    /// Session management
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Event log access
    Event {
        #[command(subcommand)]
        command: EventCommands,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Create a new session
    Create {
        /// Execution context path for the session
        working_directory: String,

        /// Session ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,

        /// Display label
        #[arg(long)]
        name: Option<String>,

        /// Tag (repeatable, order preserved)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// List all sessions, most recently active first
    List,

    /// Show one session
    Show {
        /// Session ID
        id: String,
    },

    /// Update session metadata (only the supplied fields change)
    Update {
        /// Session ID
        id: String,

        /// New display label
        #[arg(long)]
        name: Option<String>,

        /// New execution context path
        #[arg(long)]
        working_directory: Option<String>,

        /// Replacement tags (repeatable; omitting leaves tags untouched)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Delete a session and its events
    Delete {
        /// Session ID
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum EventCommands {
    /// Append an event to a session's log
    Append {
        /// Session ID
        session_id: String,

        /// Event payload as a JSON value
        data: String,
    },

    /// List a session's events in replay order
    List {
        /// Session ID
        session_id: String,
    },
}
