//! The respondent's display language, kept in their session.

use std::fmt;
use std::str::FromStr;

/// Session key the language choice is stored under.
pub const LANGUAGE_KEY: &str = "language";

/// Languages the portal can be shown in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    English,
    Welsh,
}

impl Language {
    /// The BCP 47 code, as used in the `lang` attribute and `?lang=` query.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Welsh => "cy",
        }
    }

    #[must_use]
    pub fn is_welsh(self) -> bool {
        self == Self::Welsh
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a language code is not one the portal supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported language: {}", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::English),
            "cy" => Ok(Self::Welsh),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}
