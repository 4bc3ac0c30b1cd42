//! Anti-forgery tokens for the login form.
//!
//! Tokens are derived from the session handle, so a token minted for one
//! browser is useless in another. A fresh random salt per token means the
//! page never repeats the same token bytes.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use cawi_portal_core::SessionHandle;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SALT_LEN: usize = 16;

/// Issues and checks per-session anti-forgery tokens.
pub trait CsrfGuard: Send + Sync {
    /// Returns a token valid for `handle`'s session.
    fn issue_token(&self, handle: &SessionHandle) -> String;

    /// Returns true if `supplied` was issued for `handle`'s session.
    fn verify(&self, handle: &SessionHandle, supplied: &str) -> bool;
}

/// HMAC-SHA256 token scheme: `base64url(salt) "." base64url(mac(handle || salt))`.
#[derive(Clone)]
pub struct HmacCsrfGuard {
    mac: HmacSha256,
}

impl HmacCsrfGuard {
    /// Creates a guard keyed with the process-wide CSRF secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            mac: HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length"),
        }
    }

    fn keyed(&self, handle: &SessionHandle, salt: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(handle.to_string().as_bytes());
        mac.update(salt);
        mac
    }
}

impl CsrfGuard for HmacCsrfGuard {
    fn issue_token(&self, handle: &SessionHandle) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);

        let tag = self.keyed(handle, &salt).finalize().into_bytes();
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(salt),
            URL_SAFE_NO_PAD.encode(tag)
        )
    }

    fn verify(&self, handle: &SessionHandle, supplied: &str) -> bool {
        let Some((salt, tag)) = supplied.split_once('.') else {
            return false;
        };
        let (Ok(salt), Ok(tag)) = (URL_SAFE_NO_PAD.decode(salt), URL_SAFE_NO_PAD.decode(tag))
        else {
            return false;
        };
        if salt.len() != SALT_LEN {
            return false;
        }

        self.keyed(handle, &salt).verify_slice(&tag).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> HmacCsrfGuard {
        HmacCsrfGuard::new(b"csrf-secret")
    }

    #[test]
    fn issued_token_verifies_for_same_session() {
        let guard = guard();
        let handle = SessionHandle::new();
        let token = guard.issue_token(&handle);
        assert!(guard.verify(&handle, &token));
    }

    #[test]
    fn tokens_vary_per_issue() {
        let guard = guard();
        let handle = SessionHandle::new();
        let first = guard.issue_token(&handle);
        let second = guard.issue_token(&handle);
        assert_ne!(first, second);
        assert!(guard.verify(&handle, &first));
        assert!(guard.verify(&handle, &second));
    }

    #[test]
    fn token_is_scoped_to_its_session() {
        let guard = guard();
        let token = guard.issue_token(&SessionHandle::new());
        assert!(!guard.verify(&SessionHandle::new(), &token));
    }

    #[test]
    fn token_from_another_secret_fails() {
        let handle = SessionHandle::new();
        let token = HmacCsrfGuard::new(b"other-secret").issue_token(&handle);
        assert!(!guard().verify(&handle, &token));
    }

    #[test]
    fn garbage_fails() {
        let guard = guard();
        let handle = SessionHandle::new();
        for supplied in ["", ".", "dalajksdqoosk", "a.b", "!!!.???", "AAAA.AAAA"] {
            assert!(!guard.verify(&handle, supplied), "accepted {supplied:?}");
        }
    }

    #[test]
    fn altered_tag_fails() {
        let guard = guard();
        let handle = SessionHandle::new();
        let token = guard.issue_token(&handle);
        let (salt, _) = token.split_once('.').expect("separator");
        let forged = format!("{salt}.{}", URL_SAFE_NO_PAD.encode([0u8; 32]));
        assert!(!guard.verify(&handle, &forged));
    }
}
