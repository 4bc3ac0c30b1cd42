//! Session claims: the facts a signed session token vouches for.

use chrono::{DateTime, Utc};

use crate::access_code::AccessCode;
use crate::identity::CaseIdentity;

/// The authenticated facts bound into a session token.
///
/// Claims are created once per successful login. The only field that may
/// change afterwards is `postcode_validated`, and only from false to true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    uac: AccessCode,
    case: CaseIdentity,
    postcode_validated: bool,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SessionClaims {
    pub(crate) fn new(
        uac: AccessCode,
        case: CaseIdentity,
        postcode_validated: bool,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            uac,
            case,
            postcode_validated,
            issued_at,
            expires_at,
        }
    }

    /// Returns the access code the session was opened with.
    #[must_use]
    pub fn uac(&self) -> &AccessCode {
        &self.uac
    }

    /// Returns the resolved case identity.
    #[must_use]
    pub fn case(&self) -> &CaseIdentity {
        &self.case
    }

    /// Returns true once the respondent has confirmed their postcode.
    #[must_use]
    pub fn postcode_validated(&self) -> bool {
        self.postcode_validated
    }

    /// Returns when the token was issued.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Returns when the token stops verifying.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Records that the postcode check passed. Setting it twice is a no-op.
    pub fn mark_postcode_validated(&mut self) {
        self.postcode_validated = true;
    }

    /// Returns true if these claims grant access to the named instrument.
    #[must_use]
    pub fn authenticated_for_instrument(&self, instrument_name: &str) -> bool {
        self.case
            .instrument_name()
            .eq_ignore_ascii_case(instrument_name)
    }

    /// Returns true if these claims grant access to the given case.
    #[must_use]
    pub fn authenticated_for_case(&self, case_id: &str) -> bool {
        self.case.case_id().eq_ignore_ascii_case(case_id)
    }
}
