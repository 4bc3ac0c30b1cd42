//! The lookup service seam.
//!
//! The production implementation lives in the lookup crate; tests use
//! [`crate::testutil::StaticResolver`].

use async_trait::async_trait;

use crate::access_code::AccessCode;
use crate::error::ResolverError;
use crate::identity::CaseIdentity;

/// Resolves an access code to the case it was issued for.
#[async_trait]
pub trait UacResolver: Send + Sync {
    /// Looks `code` up with a single round trip and no retries.
    ///
    /// Implementations return [`ResolverError::NotFound`] when the service
    /// answers with an incomplete identity and [`ResolverError::Unavailable`]
    /// when the call itself fails or times out.
    async fn resolve(&self, code: &AccessCode) -> Result<CaseIdentity, ResolverError>;
}
