//! Core types and utilities for the CAWI respondent portal.
//!
//! This crate provides the foundational identifier types and the shared
//! error-handling alias used by the access, lookup and server crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ParseIdError, SessionHandle};
