//! Deterministic doubles for the resolver, session store and CSRF guard.
//!
//! Enabled for this crate's own tests and, through the `testutil` feature,
//! for downstream crates' tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cawi_portal_core::SessionHandle;

use crate::access_code::AccessCode;
use crate::csrf::CsrfGuard;
use crate::error::{ResolverError, StoreError};
use crate::identity::CaseIdentity;
use crate::resolver::UacResolver;
use crate::store::{AuthSession, SessionStore};

/// A resolver that always gives the same answer and records its calls.
#[derive(Debug)]
pub struct StaticResolver {
    response: Result<CaseIdentity, ResolverError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_code: Mutex<Option<String>>,
}

impl StaticResolver {
    /// Resolves every code to `identity`.
    #[must_use]
    pub fn found(identity: CaseIdentity) -> Self {
        Self::with_response(Ok(identity))
    }

    /// Fails every lookup with `error`.
    #[must_use]
    pub fn failing(error: ResolverError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<CaseIdentity, ResolverError>) -> Self {
        Self {
            response,
            delay: None,
            calls: AtomicUsize::new(0),
            last_code: Mutex::new(None),
        }
    }

    /// Sleeps for `delay` before answering.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns how many lookups have been made.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the most recently looked-up code.
    #[must_use]
    pub fn last_code(&self) -> Option<String> {
        self.last_code.lock().clone()
    }
}

#[async_trait]
impl UacResolver for StaticResolver {
    async fn resolve(&self, code: &AccessCode) -> Result<CaseIdentity, ResolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_code.lock() = Some(code.as_str().to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}

/// A session store whose every operation fails.
#[derive(Debug, Default)]
pub struct FailingSessionStore;

impl FailingSessionStore {
    /// Creates the store.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn error() -> StoreError {
        StoreError::Backend {
            reason: "store offline".to_string(),
        }
    }
}

#[async_trait]
impl SessionStore for FailingSessionStore {
    async fn load(&self, _handle: &SessionHandle) -> Result<Option<AuthSession>, StoreError> {
        Err(Self::error())
    }

    async fn save(&self, _handle: &SessionHandle, _session: AuthSession) -> Result<(), StoreError> {
        Err(Self::error())
    }

    async fn destroy(&self, _handle: &SessionHandle) -> Result<(), StoreError> {
        Err(Self::error())
    }
}

/// A CSRF guard that issues and accepts one fixed token for every session.
#[derive(Debug, Clone)]
pub struct FixedCsrfGuard {
    token: String,
}

impl FixedCsrfGuard {
    /// Creates a guard built around `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl CsrfGuard for FixedCsrfGuard {
    fn issue_token(&self, _handle: &SessionHandle) -> String {
        self.token.clone()
    }

    fn verify(&self, _handle: &SessionHandle, supplied: &str) -> bool {
        supplied == self.token
    }
}
