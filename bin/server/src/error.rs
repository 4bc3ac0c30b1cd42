//! Errors that stop the server from starting.
//!
//! Request handling never fails the process; these are reported through
//! `rootcause::Report` from `main` and end it with a logged error.

use std::fmt;

/// Startup errors.
#[derive(Debug)]
pub enum StartupError {
    /// Configuration could not be loaded.
    Config {
        /// Error details.
        details: String,
    },
    /// The lookup client could not be built.
    Lookup {
        /// Error details.
        details: String,
    },
    /// The listener could not be bound.
    Bind {
        /// Address that was requested.
        addr: String,
        /// Error details.
        details: String,
    },
    /// The server stopped with an I/O error.
    Serve {
        /// Error details.
        details: String,
    },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "failed to load configuration: {details}"),
            Self::Lookup { details } => write!(f, "failed to create lookup client: {details}"),
            Self::Bind { addr, details } => write!(f, "failed to bind to {addr}: {details}"),
            Self::Serve { details } => write!(f, "server error: {details}"),
        }
    }
}

impl std::error::Error for StartupError {}
