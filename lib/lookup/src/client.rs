//! HTTP client for the UAC lookup service.

use async_trait::async_trait;
use cawi_portal_access::{AccessCode, CaseIdentity, ResolverError, UacResolver};
use cawi_portal_core::Result;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::LookupConfig;
use crate::error::LookupError;

const UAC_PATH: &str = "v1/uacs/uac";

#[derive(Serialize)]
struct UacRequest<'a> {
    uac: &'a str,
}

/// Resolves access codes against the lookup service.
///
/// One call per lookup, no retries. The underlying connection pool is
/// shared by clones.
#[derive(Debug, Clone)]
pub struct UacLookupClient {
    http: reqwest::Client,
    endpoint: Url,
    client_id: String,
    identity_token_url: Option<Url>,
}

impl UacLookupClient {
    /// Builds a client from `config`.
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let base = config.base_url.trim_end_matches('/');
        if base.is_empty() {
            return Err(LookupError::InvalidConfig {
                details: "base_url is empty".to_string(),
            }
            .into());
        }

        let endpoint = Url::parse(&format!("{base}/{UAC_PATH}")).map_err(|e| {
            LookupError::InvalidConfig {
                details: format!("base_url: {e}"),
            }
        })?;

        let identity_token_url = config
            .identity_token_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(Url::parse)
            .transpose()
            .map_err(|e| LookupError::InvalidConfig {
                details: format!("identity_token_url: {e}"),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| LookupError::InvalidConfig {
                details: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint,
            client_id: config.client_id.clone(),
            identity_token_url,
        })
    }

    /// Looks up the case an access code was issued for.
    ///
    /// An unknown code is not an error: the service answers 404 and this
    /// returns an empty identity.
    #[instrument(skip(self, code))]
    pub async fn get_uac_info(&self, code: &AccessCode) -> Result<CaseIdentity, LookupError> {
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .json(&UacRequest { uac: code.as_str() });

        if let Some(token) = self.identity_token().await? {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LookupError::RequestFailed {
                details: e.to_string(),
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                debug!("access code unknown to lookup service");
                return Ok(CaseIdentity::default());
            }
            status if status.is_success() => {}
            status => {
                return Err(LookupError::UnexpectedStatus {
                    status: status.as_u16(),
                }
                .into());
            }
        }

        let identity: CaseIdentity =
            response
                .json()
                .await
                .map_err(|e| LookupError::InvalidResponse {
                    details: e.to_string(),
                })?;

        debug!(
            instrument = identity.instrument_name(),
            case_id = identity.case_id(),
            "access code resolved"
        );
        Ok(identity)
    }

    /// Mints an identity token for the configured audience, if enabled.
    async fn identity_token(&self) -> Result<Option<String>, LookupError> {
        let Some(url) = &self.identity_token_url else {
            return Ok(None);
        };

        let response = self
            .http
            .get(url.clone())
            .header("Metadata-Flavor", "Google")
            .query(&[("audience", self.client_id.as_str())])
            .send()
            .await
            .map_err(|e| LookupError::IdentityTokenFailed {
                details: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(LookupError::IdentityTokenFailed {
                details: format!("metadata server returned status {}", response.status()),
            }
            .into());
        }

        let token = response
            .text()
            .await
            .map_err(|e| LookupError::IdentityTokenFailed {
                details: e.to_string(),
            })?;
        let token = token.trim();
        if token.is_empty() {
            return Err(LookupError::IdentityTokenFailed {
                details: "metadata server returned an empty token".to_string(),
            }
            .into());
        }

        Ok(Some(token.to_string()))
    }
}

#[async_trait]
impl UacResolver for UacLookupClient {
    async fn resolve(&self, code: &AccessCode) -> std::result::Result<CaseIdentity, ResolverError> {
        let identity =
            self.get_uac_info(code)
                .await
                .map_err(|report| ResolverError::Unavailable {
                    reason: report.to_string(),
                })?;

        if !identity.is_complete() {
            return Err(ResolverError::NotFound);
        }
        Ok(identity)
    }
}
