//! Signing and verification of session tokens.
//!
//! Tokens are HS256 JWTs. The wire schema ([`TokenBody`]) is private to this
//! module and separate from both [`SessionClaims`] and the lookup service's
//! [`CaseIdentity`] schema.
//!
//! Expiry is checked here, not by `jsonwebtoken`: the boundary is exact (no
//! leeway) and the caller may supply the clock.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::access_code::AccessCode;
use crate::claims::SessionClaims;
use crate::error::{DecodeError, EncodeError};
use crate::identity::CaseIdentity;

/// Issuer claim stamped into, and required of, every session token.
pub const TOKEN_ISSUER: &str = "social-surveys-web-portal";

/// An opaque signed session token.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a token string read back from a session.
    #[must_use]
    pub fn new(token: String) -> Self {
        Self(token)
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the token, returning the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenBody {
    iss: String,
    iat: i64,
    exp: i64,
    uac: String,
    postcode_validated: bool,
    case: TokenCase,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenCase {
    instrument: String,
    id: String,
}

/// Encodes claims into signed tokens and verifies them back.
///
/// The secret is loaded once at startup and never rotated.
#[derive(Clone)]
pub struct ClaimsCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl ClaimsCodec {
    /// Creates a codec signing with `secret` and issuing tokens valid for `ttl`.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.set_issuer(&[TOKEN_ISSUER]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Returns how long freshly issued tokens stay valid.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a new token for `code` and `identity`, valid from now.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Signing`] if the claims cannot be serialized or signed.
    pub fn encode(
        &self,
        code: &AccessCode,
        identity: &CaseIdentity,
    ) -> Result<SessionToken, EncodeError> {
        self.encode_at(code, identity, Utc::now())
    }

    /// Signs a new token as if the current time were `now`.
    ///
    /// Timestamps are stored in whole seconds, so `now` is truncated.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Signing`] if the claims cannot be serialized or signed.
    pub fn encode_at(
        &self,
        code: &AccessCode,
        identity: &CaseIdentity,
        now: DateTime<Utc>,
    ) -> Result<SessionToken, EncodeError> {
        let iat = now.timestamp();
        let body = TokenBody {
            iss: TOKEN_ISSUER.to_string(),
            iat,
            exp: iat + self.ttl.num_seconds(),
            uac: code.as_str().to_string(),
            postcode_validated: false,
            case: TokenCase {
                instrument: identity.instrument_name().to_string(),
                id: identity.case_id().to_string(),
            },
        };
        self.sign(&body)
    }

    /// Re-signs existing claims without moving their validity window.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Signing`] if the claims cannot be serialized or signed.
    pub fn reencode(&self, claims: &SessionClaims) -> Result<SessionToken, EncodeError> {
        let body = TokenBody {
            iss: TOKEN_ISSUER.to_string(),
            iat: claims.issued_at().timestamp(),
            exp: claims.expires_at().timestamp(),
            uac: claims.uac().as_str().to_string(),
            postcode_validated: claims.postcode_validated(),
            case: TokenCase {
                instrument: claims.case().instrument_name().to_string(),
                id: claims.case().case_id().to_string(),
            },
        };
        self.sign(&body)
    }

    /// Verifies `token` and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Invalid`] for any integrity or structure failure
    /// and [`DecodeError::Expired`] once the token's expiry has passed.
    pub fn decode(&self, token: &SessionToken) -> Result<SessionClaims, DecodeError> {
        self.decode_at(token, Utc::now())
    }

    /// Verifies `token` as if the current time were `now`.
    ///
    /// Integrity is always checked before expiry, so a tampered expired token
    /// reports `Invalid`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Invalid`] for any integrity or structure failure
    /// and [`DecodeError::Expired`] when `now` is not before the token's expiry.
    pub fn decode_at(
        &self,
        token: &SessionToken,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, DecodeError> {
        let body = jsonwebtoken::decode::<TokenBody>(
            token.as_str(),
            &self.decoding_key,
            &self.validation,
        )
        .map_err(|e| DecodeError::Invalid {
            reason: e.to_string(),
        })?
        .claims;

        let issued_at = timestamp(body.iat)?;
        let expires_at = timestamp(body.exp)?;
        if expires_at <= issued_at {
            return Err(DecodeError::Invalid {
                reason: "token expires before it was issued".to_string(),
            });
        }

        let case = CaseIdentity::new(body.case.instrument, body.case.id);
        if body.uac.is_empty() || !case.is_complete() {
            return Err(DecodeError::Invalid {
                reason: "token is missing its access code or case identity".to_string(),
            });
        }

        if now >= expires_at {
            return Err(DecodeError::Expired {
                expired_at: expires_at,
            });
        }

        Ok(SessionClaims::new(
            AccessCode::from_verified(body.uac),
            case,
            body.postcode_validated,
            issued_at,
            expires_at,
        ))
    }

    fn sign(&self, body: &TokenBody) -> Result<SessionToken, EncodeError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), body, &self.encoding_key)
            .map(SessionToken)
            .map_err(|e| EncodeError::Signing {
                reason: e.to_string(),
            })
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| DecodeError::Invalid {
        reason: format!("timestamp {secs} out of range"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_code::UacKind;
    use serde_json::json;

    const SECRET: &[u8] = b"test-signing-secret";

    fn codec() -> ClaimsCodec {
        ClaimsCodec::new(SECRET, Duration::hours(2))
    }

    fn code() -> AccessCode {
        AccessCode::validate("123456789012", UacKind::Uac12).expect("valid")
    }

    fn identity() -> CaseIdentity {
        CaseIdentity::new("foo", "bar")
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
    }

    #[test]
    fn roundtrip_preserves_code_and_identity() {
        let codec = codec();
        let token = codec.encode(&code(), &identity()).expect("encode");
        let claims = codec.decode(&token).expect("decode");

        assert_eq!(claims.uac(), &code());
        assert_eq!(claims.case(), &identity());
        assert!(!claims.postcode_validated());
    }

    #[test]
    fn validity_window_uses_ttl() {
        let codec = codec();
        let token = codec.encode_at(&code(), &identity(), t0()).expect("encode");
        let claims = codec.decode_at(&token, t0()).expect("decode");

        assert_eq!(claims.issued_at(), t0());
        assert_eq!(claims.expires_at(), t0() + Duration::hours(2));
    }

    #[test]
    fn valid_until_the_last_second() {
        let codec = codec();
        let token = codec.encode_at(&code(), &identity(), t0()).expect("encode");
        let last_moment = t0() + Duration::hours(2) - Duration::milliseconds(1);
        assert!(codec.decode_at(&token, last_moment).is_ok());
    }

    #[test]
    fn expired_at_and_after_the_boundary() {
        let codec = codec();
        let token = codec.encode_at(&code(), &identity(), t0()).expect("encode");
        let expiry = t0() + Duration::hours(2);

        for epsilon in [
            Duration::zero(),
            Duration::milliseconds(1),
            Duration::seconds(1),
            Duration::days(30),
        ] {
            match codec.decode_at(&token, expiry + epsilon) {
                Err(DecodeError::Expired { expired_at }) => assert_eq!(expired_at, expiry),
                other => panic!("expected Expired at +{epsilon}, got {other:?}"),
            }
        }
    }

    #[test]
    fn ttl_is_per_codec() {
        let short = ClaimsCodec::new(SECRET, Duration::seconds(30));
        let token = short.encode_at(&code(), &identity(), t0()).expect("encode");

        assert!(short.decode_at(&token, t0() + Duration::seconds(29)).is_ok());
        assert!(matches!(
            short.decode_at(&token, t0() + Duration::seconds(31)),
            Err(DecodeError::Expired { .. })
        ));
        assert_eq!(short.ttl(), Duration::seconds(30));
    }

    #[test]
    fn flipping_any_bit_invalidates_the_token() {
        let codec = codec();
        let token = codec.encode_at(&code(), &identity(), t0()).expect("encode");
        let bytes = token.as_str().as_bytes().to_vec();

        for index in 0..bytes.len() {
            for bit in 0..8 {
                let mut tampered = bytes.clone();
                tampered[index] ^= 1 << bit;
                let Ok(tampered) = String::from_utf8(tampered) else {
                    continue;
                };
                let result = codec.decode_at(&SessionToken::new(tampered), t0());
                assert!(
                    matches!(result, Err(DecodeError::Invalid { .. })),
                    "bit {bit} of byte {index} still decoded: {result:?}"
                );
            }
        }
    }

    #[test]
    fn tampered_expired_token_reports_invalid() {
        let codec = codec();
        let token = codec.encode_at(&code(), &identity(), t0()).expect("encode");
        let mut tampered = token.into_string();
        tampered.push('A');

        let result = codec.decode_at(&SessionToken::new(tampered), t0() + Duration::days(1));
        assert!(matches!(result, Err(DecodeError::Invalid { .. })));
    }

    #[test]
    fn rejects_token_from_another_secret() {
        let other = ClaimsCodec::new(b"another-secret", Duration::hours(2));
        let token = other.encode(&code(), &identity()).expect("encode");

        assert!(matches!(
            codec().decode(&token),
            Err(DecodeError::Invalid { .. })
        ));
    }

    #[test]
    fn malformed_input_never_panics() {
        let codec = codec();
        for garbage in [
            "",
            ".",
            "..",
            "not-a-token",
            "a.b.c",
            "eyJhbGciOiJub25lIn0.e30.",
            "\u{0}\u{1}\u{2}",
            "🦀.🦀.🦀",
        ] {
            assert!(matches!(
                codec.decode(&SessionToken::new(garbage.to_string())),
                Err(DecodeError::Invalid { .. })
            ));
        }
    }

    #[test]
    fn rejects_unexpected_claims_shape() {
        let now = Utc::now().timestamp();
        let key = EncodingKey::from_secret(SECRET);
        let header = Header::new(Algorithm::HS256);

        let extra_field = json!({
            "iss": TOKEN_ISSUER, "iat": now, "exp": now + 60,
            "uac": "123456789012", "postcode_validated": false,
            "case": {"instrument": "foo", "id": "bar"},
            "admin": true,
        });
        let flattened = json!({
            "iss": TOKEN_ISSUER, "iat": now, "exp": now + 60,
            "uac": "123456789012", "postcode_validated": false,
            "instrument_name": "foo", "case_id": "bar",
        });
        let empty_case = json!({
            "iss": TOKEN_ISSUER, "iat": now, "exp": now + 60,
            "uac": "123456789012", "postcode_validated": false,
            "case": {"instrument": "", "id": "bar"},
        });
        let wrong_issuer = json!({
            "iss": "someone-else", "iat": now, "exp": now + 60,
            "uac": "123456789012", "postcode_validated": false,
            "case": {"instrument": "foo", "id": "bar"},
        });

        for body in [extra_field, flattened, empty_case, wrong_issuer] {
            let token = jsonwebtoken::encode(&header, &body, &key).expect("encode");
            assert!(
                matches!(
                    codec().decode(&SessionToken::new(token)),
                    Err(DecodeError::Invalid { .. })
                ),
                "accepted {body}"
            );
        }
    }

    #[test]
    fn rejects_other_algorithms() {
        let now = Utc::now().timestamp();
        let body = json!({
            "iss": TOKEN_ISSUER, "iat": now, "exp": now + 60,
            "uac": "123456789012", "postcode_validated": false,
            "case": {"instrument": "foo", "id": "bar"},
        });
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &body,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("encode");

        assert!(matches!(
            codec().decode(&SessionToken::new(token)),
            Err(DecodeError::Invalid { .. })
        ));
    }

    #[test]
    fn reencode_keeps_window_and_carries_postcode_flag() {
        let codec = codec();
        let token = codec.encode_at(&code(), &identity(), t0()).expect("encode");
        let mut claims = codec.decode_at(&token, t0()).expect("decode");
        claims.mark_postcode_validated();

        let resigned = codec.reencode(&claims).expect("reencode");
        let later = t0() + Duration::minutes(30);
        let decoded = codec.decode_at(&resigned, later).expect("decode");

        assert!(decoded.postcode_validated());
        assert_eq!(decoded.issued_at(), t0());
        assert_eq!(decoded.expires_at(), claims.expires_at());
        assert_eq!(decoded.case(), &identity());
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = codec().encode(&code(), &identity()).expect("encode");
        assert_eq!(format!("{token:?}"), "SessionToken(..)");
    }
}
