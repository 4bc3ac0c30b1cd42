//! Server-side session storage.
//!
//! A session is a small string key-value bag keyed by [`SessionHandle`].
//! The handle travels to the browser inside an encrypted cookie; the bag
//! itself never leaves the server.
//!
//! Expired sessions are dropped lazily: a load drops the one it finds, and
//! every write prunes whatever else has expired. There is no background
//! sweep.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

use cawi_portal_core::SessionHandle;

use crate::error::StoreError;

/// The key-value contents of one browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    values: HashMap<String, String>,
}

impl AuthSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Returns true if no keys are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Persists sessions by handle.
///
/// Operations on one handle must never wait on operations for another.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the session for `handle`, or `None` if there is none (or it expired).
    async fn load(&self, handle: &SessionHandle) -> Result<Option<AuthSession>, StoreError>;

    /// Replaces the session for `handle`. Durable once this returns `Ok`.
    async fn save(&self, handle: &SessionHandle, session: AuthSession) -> Result<(), StoreError>;

    /// Deletes the session for `handle`. Deleting a missing session succeeds.
    async fn destroy(&self, handle: &SessionHandle) -> Result<(), StoreError>;

    /// Applies `apply` to the session for `handle` (empty if there is none)
    /// and saves the result.
    ///
    /// The default loads then saves, so concurrent updates to one handle are
    /// last-writer-wins. Stores that can apply the change in place override it.
    async fn update(
        &self,
        handle: &SessionHandle,
        apply: &(dyn for<'s> Fn(&'s mut AuthSession) + Send + Sync),
    ) -> Result<(), StoreError> {
        let mut session = self.load(handle).await?.unwrap_or_default();
        apply(&mut session);
        self.save(handle, session).await
    }
}

#[derive(Debug, Clone)]
struct StoredSession {
    session: AuthSession,
    expires_at: DateTime<Utc>,
}

/// In-process session store.
///
/// The lock is held only for the map operation itself, never across an
/// await point, so sessions do not block one another.
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionHandle, StoredSession>>,
    max_age: Duration,
}

impl MemorySessionStore {
    /// Creates an empty store whose sessions live for `max_age` after their last save.
    #[must_use]
    pub fn new(max_age: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_age,
        }
    }

    /// Returns the number of sessions currently held, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns true if the store holds no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    fn load_at(&self, handle: &SessionHandle, now: DateTime<Utc>) -> Option<AuthSession> {
        {
            let sessions = self.sessions.read();
            match sessions.get(handle) {
                None => return None,
                Some(stored) if now < stored.expires_at => return Some(stored.session.clone()),
                Some(_) => {}
            }
        }

        let mut sessions = self.sessions.write();
        if sessions
            .get(handle)
            .is_some_and(|stored| now >= stored.expires_at)
        {
            sessions.remove(handle);
            tracing::debug!(session = %handle, "dropped expired session");
        }
        None
    }

    fn save_at(&self, handle: &SessionHandle, session: AuthSession, now: DateTime<Utc>) {
        let mut sessions = self.sessions.write();
        Self::prune(&mut sessions, now);
        sessions.insert(
            *handle,
            StoredSession {
                session,
                expires_at: now + self.max_age,
            },
        );
    }

    fn update_at(
        &self,
        handle: &SessionHandle,
        apply: &(dyn Fn(&mut AuthSession) + Send + Sync),
        now: DateTime<Utc>,
    ) {
        let mut sessions = self.sessions.write();
        Self::prune(&mut sessions, now);
        let mut session = sessions
            .remove(handle)
            .map(|stored| stored.session)
            .unwrap_or_default();
        apply(&mut session);
        sessions.insert(
            *handle,
            StoredSession {
                session,
                expires_at: now + self.max_age,
            },
        );
    }

    fn prune(sessions: &mut HashMap<SessionHandle, StoredSession>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, stored| now < stored.expires_at);
        let dropped = before - sessions.len();
        if dropped > 0 {
            tracing::debug!(dropped, "pruned expired sessions");
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, handle: &SessionHandle) -> Result<Option<AuthSession>, StoreError> {
        Ok(self.load_at(handle, Utc::now()))
    }

    async fn save(&self, handle: &SessionHandle, session: AuthSession) -> Result<(), StoreError> {
        self.save_at(handle, session, Utc::now());
        Ok(())
    }

    async fn destroy(&self, handle: &SessionHandle) -> Result<(), StoreError> {
        self.sessions.write().remove(handle);
        Ok(())
    }

    async fn update(
        &self,
        handle: &SessionHandle,
        apply: &(dyn for<'s> Fn(&'s mut AuthSession) + Send + Sync),
    ) -> Result<(), StoreError> {
        self.update_at(handle, apply, Utc::now());
        Ok(())
    }
}
