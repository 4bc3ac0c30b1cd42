//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested keys
//! use `__` as the separator, e.g. `SESSION__SECRET` or `LOOKUP__BASE_URL`.
//!
//! See [`LookupConfig`] for the lookup service settings.

use cawi_portal_access::UacKind;
use cawi_portal_lookup::LookupConfig;
use serde::Deserialize;
use std::net::SocketAddr;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Which access-code format this deployment accepts.
    #[serde(default)]
    pub uac_kind: UacKind,

    /// Relaxes production-only behaviour (HSTS) for local development.
    #[serde(default)]
    pub dev_mode: bool,

    /// Session configuration.
    pub session: SessionConfig,

    /// Session token signing configuration.
    pub token: TokenConfig,

    /// Anti-forgery token configuration.
    #[serde(default)]
    pub csrf: CsrfConfig,

    /// Lookup service configuration.
    pub lookup: LookupConfig,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Secret authenticating the session cookie.
    pub secret: String,

    /// Secret encrypting the session cookie.
    pub encryption_secret: String,

    /// Session lifetime in minutes, for both the cookie and the server-side store.
    #[serde(default = "default_session_max_age_minutes")]
    pub max_age_minutes: i64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// HS256 signing secret.
    pub secret: String,

    /// Token lifetime in minutes.
    #[serde(default = "default_token_ttl_minutes")]
    pub ttl_minutes: i64,
}

/// Anti-forgery token configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CsrfConfig {
    /// HMAC secret. Falls back to the session secret when unset.
    #[serde(default)]
    pub secret: Option<String>,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_session_max_age_minutes() -> i64 {
    120
}

fn default_token_ttl_minutes() -> i64 {
    120
}

fn default_secure_cookies() -> bool {
    true
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        let required = [
            ("session.secret", &self.session.secret),
            ("session.encryption_secret", &self.session.encryption_secret),
            ("token.secret", &self.token.secret),
            ("lookup.base_url", &self.lookup.base_url),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(config::ConfigError::Message(format!("{key} must not be empty")));
            }
        }
        if self.session.max_age_minutes <= 0 || self.token.ttl_minutes <= 0 {
            return Err(config::ConfigError::Message(
                "session and token lifetimes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the CSRF secret, defaulting to the session secret.
    #[must_use]
    pub fn csrf_secret(&self) -> &str {
        self.csrf
            .secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .unwrap_or(&self.session.secret)
    }
}
