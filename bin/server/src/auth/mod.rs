//! Respondent authentication for the portal.
//!
//! This module provides:
//! - Shared application state built from configuration
//! - Session handle and source address extractors for Axum routes
//! - Login, logout and session-gated routes
//!
//! A browser's session handle travels in an encrypted private cookie. The
//! session contents (the signed token) stay server-side and are only
//! reached through the [`Authenticator`].

pub mod middleware;
pub mod routes;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use cawi_portal_access::{
    Authenticator, ClaimsCodec, CsrfGuard, HmacCsrfGuard, MemorySessionStore, SessionBinder,
    UacResolver,
};
use chrono::Duration;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::config::ServerConfig;

pub use middleware::{SessionContext, SourceAddr};

/// Cookie attributes for the session handle cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    /// Whether to set the Secure flag.
    pub secure: bool,
    /// Cookie lifetime.
    pub max_age: Duration,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Login and session checks.
    pub authenticator: Authenticator,
    /// Anti-forgery tokens for the login form.
    pub csrf: Arc<dyn CsrfGuard>,
    /// Key for the private session cookie.
    pub cookie_key: Key,
    /// Session cookie attributes.
    pub cookies: CookieSettings,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        authenticator: Authenticator,
        csrf: Arc<dyn CsrfGuard>,
        cookie_key: Key,
        cookies: CookieSettings,
    ) -> Self {
        Self {
            authenticator,
            csrf,
            cookie_key,
            cookies,
        }
    }

    /// Wires the production session store, codec and CSRF guard around `resolver`.
    pub fn from_config(config: &ServerConfig, resolver: Arc<dyn UacResolver>) -> Self {
        let session_max_age = Duration::minutes(config.session.max_age_minutes);
        let store = Arc::new(MemorySessionStore::new(session_max_age));
        let codec = ClaimsCodec::new(
            config.token.secret.as_bytes(),
            Duration::minutes(config.token.ttl_minutes),
        );
        let authenticator = Authenticator::new(
            config.uac_kind,
            resolver,
            codec,
            SessionBinder::new(store),
        )
        .with_resolve_timeout(std::time::Duration::from_millis(config.lookup.timeout_ms));

        Self::new(
            authenticator,
            Arc::new(HmacCsrfGuard::new(config.csrf_secret().as_bytes())),
            derive_cookie_key(&config.session.secret, &config.session.encryption_secret),
            CookieSettings {
                secure: config.session.secure_cookies,
                max_age: session_max_age,
            },
        )
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derives the 64-byte cookie key from the two session secrets.
///
/// The first half signs, the second half encrypts.
pub fn derive_cookie_key(secret: &str, encryption_secret: &str) -> Key {
    let mut material = [0u8; 64];
    material[..32].copy_from_slice(&Sha256::digest(secret.as_bytes()));
    material[32..].copy_from_slice(&Sha256::digest(encryption_secret.as_bytes()));
    Key::from(&material)
}
