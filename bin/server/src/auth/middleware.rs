//! Session and request-origin extractors for Axum.

use axum::{
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use cawi_portal_core::SessionHandle;
use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;
use time::Duration as TimeDuration;

use super::AppState;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// The browser's session handle and the cookie jar carrying it.
///
/// A handle is minted on the first request that has none (or one that fails
/// to decrypt). Only then does the jar hold a new cookie, so handlers must
/// return the jar for it to be sent.
pub struct SessionContext {
    /// Server-side session key.
    pub handle: SessionHandle,
    /// Private jar holding the handle cookie.
    pub jar: PrivateCookieJar,
}

impl<S> FromRequestParts<S> for SessionContext
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = PrivateCookieJar::from_headers(&parts.headers, app_state.cookie_key.clone());

        let existing = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| cookie.value().parse::<SessionHandle>().ok());

        if let Some(handle) = existing {
            return Ok(Self { handle, jar });
        }

        let handle = SessionHandle::new();
        tracing::debug!(session = %handle, "starting new session");

        let cookie = Cookie::build((SESSION_COOKIE, handle.to_string()))
            .path("/")
            .http_only(true)
            .secure(app_state.cookies.secure)
            .same_site(SameSite::Strict)
            .max_age(TimeDuration::seconds(
                app_state.cookies.max_age.num_seconds(),
            ));

        Ok(Self {
            handle,
            jar: jar.add(cookie),
        })
    }
}

/// Best-effort address of the caller, for logging.
///
/// Prefers the first `X-Forwarded-For` hop, then `X-Real-IP`, then the
/// socket peer address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAddr(pub String);

impl SourceAddr {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim);
        let real_ip = headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim);

        forwarded
            .filter(|addr| !addr.is_empty())
            .or(real_ip.filter(|addr| !addr.is_empty()))
            .map(|addr| Self(addr.to_string()))
    }
}

impl fmt::Display for SourceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S> FromRequestParts<S> for SourceAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(addr) = Self::from_headers(&parts.headers) {
            return Ok(addr);
        }

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self(peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(
            SourceAddr::from_headers(&headers),
            Some(SourceAddr("203.0.113.7".to_string()))
        );
    }

    #[test]
    fn real_ip_is_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(
            SourceAddr::from_headers(&headers),
            Some(SourceAddr("10.0.0.2".to_string()))
        );
    }

    #[test]
    fn no_headers_is_none() {
        assert_eq!(SourceAddr::from_headers(&HeaderMap::new()), None);
    }
}
