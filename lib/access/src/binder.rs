//! Binds a session token to a browser session.

use std::sync::Arc;

use cawi_portal_core::SessionHandle;

use crate::codec::SessionToken;
use crate::error::StoreError;
use crate::language::{LANGUAGE_KEY, Language};
use crate::store::{AuthSession, SessionStore};

/// Session key the token is stored under.
pub const TOKEN_KEY: &str = "jwt_token";

/// Gets, sets and clears the session token for a handle.
///
/// The binder never decodes tokens; verification belongs to the codec.
#[derive(Clone)]
pub struct SessionBinder {
    store: Arc<dyn SessionStore>,
}

impl SessionBinder {
    /// Creates a binder over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Returns the token bound to `handle`, if any.
    ///
    /// A store failure is logged and reported as "no token".
    pub async fn get(&self, handle: &SessionHandle) -> Option<SessionToken> {
        match self.store.load(handle).await {
            Ok(session) => session
                .and_then(|s| s.get(TOKEN_KEY).map(str::to_string))
                .map(SessionToken::new),
            Err(e) => {
                tracing::warn!(error = %e, session = %handle, "failed to load session");
                None
            }
        }
    }

    /// Binds `token` to `handle`, keeping any other session keys.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the session could not be read or persisted.
    pub async fn set(&self, handle: &SessionHandle, token: SessionToken) -> Result<(), StoreError> {
        let token = token.into_string();
        self.store
            .update(handle, &move |session| session.insert(TOKEN_KEY, token.clone()))
            .await
    }

    /// Returns the language chosen for `handle`, English if none was chosen.
    ///
    /// A store failure or an unreadable value is treated as no choice.
    pub async fn language(&self, handle: &SessionHandle) -> Language {
        match self.store.load(handle).await {
            Ok(session) => session
                .and_then(|s| s.get(LANGUAGE_KEY).and_then(|code| code.parse().ok()))
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, session = %handle, "failed to load session");
                Language::default()
            }
        }
    }

    /// Records `language` for `handle`, keeping any other session keys.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the session could not be persisted.
    pub async fn set_language(
        &self,
        handle: &SessionHandle,
        language: Language,
    ) -> Result<(), StoreError> {
        self.store
            .update(handle, &move |session| {
                session.insert(LANGUAGE_KEY, language.code());
            })
            .await
    }

    /// Removes every key from the session behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the session could not be removed.
    pub async fn clear(&self, handle: &SessionHandle) -> Result<(), StoreError> {
        self.store.destroy(handle).await
    }

    /// Returns the raw session behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the session could not be read.
    pub async fn session(&self, handle: &SessionHandle) -> Result<AuthSession, StoreError> {
        Ok(self.store.load(handle).await?.unwrap_or_default())
    }
}
