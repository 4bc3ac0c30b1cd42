//! Access-code authentication for the CAWI respondent portal.
//!
//! A respondent proves they were invited by entering the access code from
//! their letter. The code is resolved to the case it belongs to, and the
//! result is sealed in a signed token held in the respondent's server-side
//! session. Later requests are gated on that token.

mod access_code;
mod auth;
mod binder;
mod claims;
mod codec;
mod csrf;
mod error;
mod identity;
mod language;
mod resolver;
mod store;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use access_code::{AccessCode, UacKind};
pub use auth::{Authenticator, DEFAULT_RESOLVE_TIMEOUT};
pub use binder::{SessionBinder, TOKEN_KEY};
pub use claims::SessionClaims;
pub use codec::{ClaimsCodec, SessionToken, TOKEN_ISSUER};
pub use csrf::{CsrfGuard, HmacCsrfGuard};
pub use error::{
    DecodeError, EncodeError, INTERNAL_ERROR_MESSAGE, LoginError, NOT_RECOGNISED_MESSAGE,
    NO_ACCESS_CODE_MESSAGE, ResolverError, SessionError, StoreError, ValidationError,
};
pub use identity::CaseIdentity;
pub use language::{LANGUAGE_KEY, Language, UnknownLanguage};
pub use resolver::UacResolver;
pub use store::{AuthSession, MemorySessionStore, SessionStore};
