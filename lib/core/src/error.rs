//! Shared `Result` alias for fallible operations at process and network seams.
//!
//! Domain errors are plain enums owned by the crate that raises them. Code
//! that talks to something outside the process (the lookup service, the
//! listener socket, configuration sources) returns them wrapped in a
//! rootcause [`Report`]; a bare domain error converts into one with `?`.

use rootcause::Report;

/// `Result` whose error is a [`Report`] carrying a `C` context.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
