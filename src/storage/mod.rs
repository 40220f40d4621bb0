//! SQLite storage layer for Recall.
//!
//! This module provides the persistence layer using SQLite with:
//! - WAL mode for concurrent reads under a single writer
//! - Transaction discipline for composite writes
//! - Idempotent, lazy schema initialization
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - The session store implementation

pub mod schema;
pub mod sqlite;

pub use sqlite::SessionStore;
