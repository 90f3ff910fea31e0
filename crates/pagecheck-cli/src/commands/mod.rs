//! Command implementations.
//!
//! - [`check`] - validate one page
//! - [`backends`] - report which browser backends are usable
//!
//! Each `execute` returns the process exit code on success; errors are
//! configuration or I/O problems that stopped the command from running.

pub mod backends;
pub mod check;

pub use backends::execute as backends_execute;
pub use check::execute as check_execute;
