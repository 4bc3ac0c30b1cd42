//! Error types for the access crate.
//!
//! Each stage of the login flow has its own error type, logged with its
//! precise cause. Only [`LoginError::user_message`] decides what a
//! respondent gets to see, and it never includes error detail.

use chrono::{DateTime, Utc};
use std::fmt;

/// Shown when the submitted code is blank.
pub const NO_ACCESS_CODE_MESSAGE: &str = "Enter an access code";

/// Shown for every resolver failure, whatever the cause.
pub const NOT_RECOGNISED_MESSAGE: &str = "Access code not recognised. Enter the code again";

/// Shown when the portal itself failed to complete the login.
pub const INTERNAL_ERROR_MESSAGE: &str =
    "We were unable to process your request, please try again";

/// Access code shape errors, detected before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Nothing left after stripping whitespace.
    EmptyCode,
    /// The stripped code has the wrong number of characters.
    WrongLength { expected: usize, actual: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCode => write!(f, "access code is empty"),
            Self::WrongLength { expected, actual } => {
                write!(
                    f,
                    "access code has {actual} characters, expected {expected}"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Failures resolving an access code to a case identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    /// The lookup service answered but does not know the code.
    NotFound,
    /// The lookup service could not be reached, failed or timed out.
    Unavailable { reason: String },
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "access code not found"),
            Self::Unavailable { reason } => {
                write!(f, "access code lookup unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for ResolverError {}

/// Failure to sign a set of claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Serialization or signing failed.
    Signing { reason: String },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signing { reason } => write!(f, "failed to sign session token: {reason}"),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Failure to verify a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Bad signature, wrong secret, wrong issuer or malformed structure.
    Invalid { reason: String },
    /// The token verified but its validity window has closed.
    Expired { expired_at: DateTime<Utc> },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { reason } => write!(f, "invalid session token: {reason}"),
            Self::Expired { expired_at } => {
                write!(f, "session token expired at {expired_at}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Session store failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store rejected or failed the operation.
    Backend { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend { reason } => write!(f, "session store error: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Why a login attempt did not produce a bound session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// The submitted code has the wrong shape.
    Validation(ValidationError),
    /// The lookup service did not resolve the code.
    NotRecognised(ResolverError),
    /// The claims could not be signed.
    Encode(EncodeError),
    /// The token could not be stored against the session.
    Store(StoreError),
}

impl LoginError {
    /// The message a respondent sees for this failure.
    ///
    /// Every resolver failure maps to the same message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(ValidationError::EmptyCode) => NO_ACCESS_CODE_MESSAGE.to_string(),
            Self::Validation(ValidationError::WrongLength { expected, .. }) => {
                format!("Enter a {expected}-character access code")
            }
            Self::NotRecognised(_) => NOT_RECOGNISED_MESSAGE.to_string(),
            Self::Encode(_) | Self::Store(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Returns true for failures caused by the portal rather than the respondent.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Encode(_) | Self::Store(_))
    }
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "login rejected: {e}"),
            Self::NotRecognised(e) => write!(f, "login rejected: {e}"),
            Self::Encode(e) => write!(f, "login failed: {e}"),
            Self::Store(e) => write!(f, "login failed: {e}"),
        }
    }
}

impl std::error::Error for LoginError {}

impl From<ValidationError> for LoginError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<ResolverError> for LoginError {
    fn from(e: ResolverError) -> Self {
        Self::NotRecognised(e)
    }
}

impl From<EncodeError> for LoginError {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

impl From<StoreError> for LoginError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Why there is no usable session for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No token is bound to the session.
    NoSession,
    /// A token is bound but does not verify.
    Decode(DecodeError),
    /// Re-signing updated claims failed.
    Encode(EncodeError),
    /// Storing updated claims failed.
    Store(StoreError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSession => write!(f, "no session token"),
            Self::Decode(e) => write!(f, "{e}"),
            Self::Encode(e) => write!(f, "{e}"),
            Self::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<DecodeError> for SessionError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

impl From<EncodeError> for SessionError {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
