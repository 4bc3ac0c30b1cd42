//! Lookup client configuration.

use serde::Deserialize;

/// Where and how to reach the lookup service.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Base URL of the lookup service, without the `/v1/...` path.
    pub base_url: String,

    /// Audience requested for identity tokens.
    #[serde(default)]
    pub client_id: String,

    /// Metadata endpoint that mints identity tokens.
    ///
    /// When unset, requests are sent without an `Authorization` header.
    #[serde(default)]
    pub identity_token_url: Option<String>,

    /// Upper bound on each HTTP call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl LookupConfig {
    /// Creates an unauthenticated configuration pointing at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: String::new(),
            identity_token_url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}
