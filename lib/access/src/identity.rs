//! The case identity an access code resolves to.

use serde::{Deserialize, Serialize};

/// Which questionnaire (instrument) and which case within it a code belongs to.
///
/// This is the lookup service's response schema. Missing fields deserialize
/// as empty strings, and an identity with an empty field is treated as
/// "not found".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CaseIdentity {
    #[serde(default)]
    instrument_name: String,
    #[serde(default)]
    case_id: String,
}

impl CaseIdentity {
    /// Creates a case identity.
    #[must_use]
    pub fn new(instrument_name: impl Into<String>, case_id: impl Into<String>) -> Self {
        Self {
            instrument_name: instrument_name.into(),
            case_id: case_id.into(),
        }
    }

    /// Returns the instrument name.
    #[must_use]
    pub fn instrument_name(&self) -> &str {
        &self.instrument_name
    }

    /// Returns the case ID.
    #[must_use]
    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    /// Returns true if both the instrument name and case ID are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.instrument_name.is_empty() && !self.case_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_identity() {
        let identity = CaseIdentity::new("foo", "bar");
        assert!(identity.is_complete());
        assert_eq!(identity.instrument_name(), "foo");
        assert_eq!(identity.case_id(), "bar");
    }

    #[test]
    fn empty_fields_are_incomplete() {
        assert!(!CaseIdentity::new("", "bar").is_complete());
        assert!(!CaseIdentity::new("foo", "").is_complete());
        assert!(!CaseIdentity::default().is_complete());
    }

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let identity: CaseIdentity =
            serde_json::from_str(r#"{"instrument_name": "dst2101a"}"#).expect("deserialize");
        assert_eq!(identity.instrument_name(), "dst2101a");
        assert_eq!(identity.case_id(), "");
        assert!(!identity.is_complete());
    }
}
