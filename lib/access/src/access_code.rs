//! Access code shape validation.
//!
//! Codes are issued out of band on paper, so respondents type them with
//! arbitrary spacing. Only the shape is checked here; whether a code is real
//! is decided by the lookup service.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Which family of access codes a deployment accepts.
///
/// The two kinds are mutually exclusive per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UacKind {
    /// 12-character numeric codes.
    #[default]
    #[serde(rename = "uac")]
    Uac12,
    /// 16-character alphanumeric codes.
    #[serde(rename = "uac16")]
    Uac16,
}

impl UacKind {
    /// Number of characters a code of this kind has once whitespace is removed.
    #[must_use]
    pub const fn code_length(self) -> usize {
        match self {
            Self::Uac12 => 12,
            Self::Uac16 => 16,
        }
    }
}

impl fmt::Display for UacKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uac12 => write!(f, "uac"),
            Self::Uac16 => write!(f, "uac16"),
        }
    }
}

/// A whitespace-free access code of the configured length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessCode(String);

impl AccessCode {
    /// Strips whitespace from `raw` and checks its length against `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyCode`] when nothing but whitespace was
    /// supplied, or [`ValidationError::WrongLength`] when the stripped code
    /// is not exactly `kind.code_length()` characters.
    pub fn validate(raw: &str, kind: UacKind) -> Result<Self, ValidationError> {
        let code: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

        if code.is_empty() {
            return Err(ValidationError::EmptyCode);
        }

        let actual = code.chars().count();
        let expected = kind.code_length();
        if actual != expected {
            return Err(ValidationError::WrongLength { expected, actual });
        }

        Ok(Self(code))
    }

    /// Returns the normalized code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rebuilds a code from an already verified token.
    pub(crate) fn from_verified(code: String) -> Self {
        Self(code)
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
