//! Async facade over the synchronous store.
//!
//! The session service consumes the store from async context; every call
//! here awaits an async mutex and runs the bounded synchronous operation
//! while holding it, which also serializes writers on the single
//! connection. Handles are cheap to clone and share.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::Result;
use crate::model::{NewSession, Session, SessionEvent, SessionPatch};
use crate::storage::SessionStore;

/// Cloneable, async-callable handle to a [`SessionStore`].
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<Mutex<SessionStore>>,
}

impl StoreHandle {
    /// Wrap an existing store.
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Create a handle over a lazily initialized store at `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no database location can be determined.
    pub fn connect(path: Option<&Path>) -> Result<Self> {
        Ok(Self::new(SessionStore::new(path)?))
    }

    /// See [`SessionStore::create_session`].
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateSession` if the id already exists.
    pub async fn create_session(&self, new: NewSession) -> Result<Session> {
        self.inner.lock().await.create_session(new)
    }

    /// See [`SessionStore::get_session`].
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_session(&self, id: &str) -> Result<Option<Session>> {
        self.inner.lock().await.get_session(id)
    }

    /// See [`SessionStore::list_sessions`].
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.inner.lock().await.list_sessions()
    }

    /// See [`SessionStore::update_session`].
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionNotFound` if the id does not exist.
    pub async fn update_session(&self, id: &str, patch: &SessionPatch) -> Result<Session> {
        self.inner.lock().await.update_session(id, patch)
    }

    /// See [`SessionStore::delete_session`].
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_session(&self, id: &str) -> Result<bool> {
        self.inner.lock().await.delete_session(id)
    }

    /// See [`SessionStore::append_event`].
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionNotFound` if the session does not exist.
    pub async fn append_event(
        &self,
        session_id: &str,
        payload: serde_json::Value,
    ) -> Result<SessionEvent> {
        self.inner.lock().await.append_event(session_id, payload)
    }

    /// See [`SessionStore::get_session_events`].
    ///
    /// # Errors
    ///
    /// Returns `Error::SessionNotFound` if the session does not exist.
    pub async fn get_session_events(&self, session_id: &str) -> Result<Vec<SessionEvent>> {
        self.inner.lock().await.get_session_events(session_id)
    }

    /// See [`SessionStore::close`].
    pub async fn close(&self) {
        self.inner.lock().await.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_handle_round_trip() {
        let handle = StoreHandle::new(SessionStore::open_memory().unwrap());

        handle
            .create_session(NewSession::new("sess_1", "/tmp/project"))
            .await
            .unwrap();
        handle
            .append_event("sess_1", json!({"type": "a"}))
            .await
            .unwrap();

        let events = handle.get_session_events("sess_1").await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_data["type"], "a");
    }

    #[tokio::test]
    async fn test_clones_share_the_store() {
        let handle = StoreHandle::new(SessionStore::open_memory().unwrap());
        let other = handle.clone();

        handle
            .create_session(NewSession::new("sess_1", "/tmp"))
            .await
            .unwrap();

        let seen = other.get_session("sess_1").await.unwrap();
        assert!(seen.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_appends_all_land() {
        let handle = StoreHandle::new(SessionStore::open_memory().unwrap());
        handle
            .create_session(NewSession::new("sess_1", "/tmp"))
            .await
            .unwrap();

        let mut tasks = Vec::new();
        for n in 0..8 {
            let h = handle.clone();
            tasks.push(tokio::spawn(async move {
                h.append_event("sess_1", json!({"n": n})).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let events = handle.get_session_events("sess_1").await.unwrap();
        assert_eq!(events.len(), 8);
        // Replay order is (timestamp, id) ascending regardless of race winners
        assert!(events.windows(2).all(|w| {
            (w[0].timestamp, w[0].id) < (w[1].timestamp, w[1].id)
        }));
    }
}
