//! Lookup client errors.
//!
//! Operations return `Report<LookupError>`; the resolver boundary flattens
//! them into [`ResolverError`](cawi_portal_access::ResolverError).

use std::fmt;

/// Lookup service errors.
#[derive(Debug)]
pub enum LookupError {
    /// The client could not be built from its configuration.
    InvalidConfig {
        /// Error details.
        details: String,
    },
    /// An identity token could not be obtained.
    IdentityTokenFailed {
        /// Error details.
        details: String,
    },
    /// The request could not be sent or timed out.
    RequestFailed {
        /// Error details.
        details: String,
    },
    /// The service answered with an unexpected status.
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
    },
    /// The response body could not be decoded.
    InvalidResponse {
        /// Error details.
        details: String,
    },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { details } => {
                write!(f, "invalid lookup configuration: {details}")
            }
            Self::IdentityTokenFailed { details } => {
                write!(f, "failed to obtain identity token: {details}")
            }
            Self::RequestFailed { details } => write!(f, "lookup request failed: {details}"),
            Self::UnexpectedStatus { status } => {
                write!(f, "lookup service returned status {status}")
            }
            Self::InvalidResponse { details } => {
                write!(f, "invalid lookup response: {details}")
            }
        }
    }
}

impl std::error::Error for LookupError {}
