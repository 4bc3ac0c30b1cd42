//! Client for the UAC lookup service.
//!
//! The lookup service maps an access code to the survey instrument and case
//! it was issued for. [`UacLookupClient`] is the production
//! [`UacResolver`](cawi_portal_access::UacResolver).

mod client;
mod config;
mod error;

pub use client::UacLookupClient;
pub use config::LookupConfig;
pub use error::LookupError;
