//! The login and session-gating flow.
//!
//! A login is a single pass with terminal outcomes only:
//!
//! ```text
//! validate code ─┬─ EmptyCode | WrongLength ─────────► not authenticated
//! resolve code  ─┼─ NotFound | Unavailable ──────────► not authenticated
//! encode token  ─┼─ signing failure ─────────────────► not authenticated (internal)
//! bind token    ─┴─ store failure ───────────────────► not authenticated (internal)
//!                └─ success ─────────────────────────► authenticated for the instrument
//! ```
//!
//! Binding the token is the only side effect and happens last, so an
//! abandoned login leaves the session untouched.

use std::sync::Arc;
use std::time::Duration;

use cawi_portal_core::SessionHandle;
use tracing::instrument;

use crate::access_code::{AccessCode, UacKind};
use crate::binder::SessionBinder;
use crate::claims::SessionClaims;
use crate::codec::ClaimsCodec;
use crate::error::{LoginError, ResolverError, SessionError, StoreError};
use crate::identity::CaseIdentity;
use crate::language::Language;
use crate::resolver::UacResolver;

/// Upper bound on a single lookup call unless configured otherwise.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs logins, logouts and session checks for one deployment.
#[derive(Clone)]
pub struct Authenticator {
    uac_kind: UacKind,
    resolver: Arc<dyn UacResolver>,
    codec: ClaimsCodec,
    binder: SessionBinder,
    resolve_timeout: Duration,
}

impl Authenticator {
    /// Creates an authenticator accepting codes of `uac_kind`.
    #[must_use]
    pub fn new(
        uac_kind: UacKind,
        resolver: Arc<dyn UacResolver>,
        codec: ClaimsCodec,
        binder: SessionBinder,
    ) -> Self {
        Self {
            uac_kind,
            resolver,
            codec,
            binder,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }

    /// Sets the upper bound on a lookup call.
    #[must_use]
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    /// Returns the kind of access code this deployment accepts.
    #[must_use]
    pub fn uac_kind(&self) -> UacKind {
        self.uac_kind
    }

    /// Exchanges a submitted access code for a session bound to `handle`.
    ///
    /// On success returns the identity the session is authenticated for;
    /// its instrument name is the respondent's landing page.
    ///
    /// # Errors
    ///
    /// Returns a [`LoginError`] naming the stage that failed. Nothing is
    /// written to the session unless the whole flow succeeds.
    #[instrument(skip(self, raw_code), fields(session = %handle))]
    pub async fn login(
        &self,
        handle: &SessionHandle,
        raw_code: &str,
    ) -> Result<CaseIdentity, LoginError> {
        let code = AccessCode::validate(raw_code, self.uac_kind).inspect_err(|e| {
            tracing::info!(error = %e, "access code rejected");
        })?;

        let identity = self.resolve(&code).await.inspect_err(|e| match e {
            ResolverError::NotFound => tracing::info!("access code not recognised"),
            ResolverError::Unavailable { reason } => {
                tracing::warn!(reason = %reason, "access code lookup failed");
            }
        })?;

        let token = self.codec.encode(&code, &identity).inspect_err(|e| {
            tracing::error!(error = %e, "failed to sign session token");
        })?;

        self.binder.set(handle, token).await.inspect_err(|e| {
            tracing::error!(error = %e, "failed to bind session token");
        })?;

        tracing::info!(
            instrument = identity.instrument_name(),
            case_id = identity.case_id(),
            "respondent authenticated"
        );
        Ok(identity)
    }

    async fn resolve(&self, code: &AccessCode) -> Result<CaseIdentity, ResolverError> {
        let identity =
            match tokio::time::timeout(self.resolve_timeout, self.resolver.resolve(code)).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(ResolverError::Unavailable {
                        reason: format!("lookup timed out after {:?}", self.resolve_timeout),
                    });
                }
            };

        if !identity.is_complete() {
            tracing::debug!(
                instrument = identity.instrument_name(),
                case_id = identity.case_id(),
                "lookup returned an incomplete identity"
            );
            return Err(ResolverError::NotFound);
        }
        Ok(identity)
    }

    /// Returns the verified claims for `handle`'s session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoSession`] when no token is bound and
    /// [`SessionError::Decode`] when the bound token does not verify.
    pub async fn session(&self, handle: &SessionHandle) -> Result<SessionClaims, SessionError> {
        let token = self
            .binder
            .get(handle)
            .await
            .ok_or(SessionError::NoSession)?;
        Ok(self.codec.decode(&token)?)
    }

    /// Returns the claims if `handle` has a valid session.
    ///
    /// Invalid and expired tokens are treated exactly like a missing one;
    /// the reason is only logged.
    pub async fn has_session(&self, handle: &SessionHandle) -> Option<SessionClaims> {
        match self.session(handle).await {
            Ok(claims) => Some(claims),
            Err(SessionError::NoSession) => None,
            Err(e) => {
                tracing::info!(error = %e, session = %handle, "session token rejected");
                None
            }
        }
    }

    /// Removes everything from `handle`'s session.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the session could not be cleared.
    pub async fn logout(&self, handle: &SessionHandle) -> Result<(), StoreError> {
        self.binder.clear(handle).await
    }

    /// Returns the display language chosen for `handle`'s session.
    pub async fn language(&self, handle: &SessionHandle) -> Language {
        self.binder.language(handle).await
    }

    /// Records the display language for `handle`'s session.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the choice could not be saved.
    pub async fn set_language(
        &self,
        handle: &SessionHandle,
        language: Language,
    ) -> Result<(), StoreError> {
        self.binder.set_language(handle, language).await
    }

    /// Records a successful postcode check in the session's claims.
    ///
    /// The claims are re-signed with their original validity window.
    ///
    /// # Errors
    ///
    /// Fails if there is no valid session or the updated token cannot be
    /// signed or stored.
    pub async fn mark_postcode_validated(
        &self,
        handle: &SessionHandle,
    ) -> Result<SessionClaims, SessionError> {
        let mut claims = self.session(handle).await?;
        if claims.postcode_validated() {
            return Ok(claims);
        }

        claims.mark_postcode_validated();
        let token = self.codec.reencode(&claims)?;
        self.binder.set(handle, token).await?;
        Ok(claims)
    }
}
