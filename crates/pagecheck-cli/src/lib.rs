//! # pagecheck CLI
//!
//! Command-line front end for the `pagecheck` library: load a page in a
//! headless browser, print what went wrong, exit with a code CI can act on.
//!
//! ## Modules
//!
//! - [`cli`]: argument parsing (clap derive)
//! - [`config`]: layered configuration (defaults, `pagecheck.config.json`,
//!   `PAGECHECK_*` environment, flags) via figment
//! - [`commands`]: `check` and `backends`
//! - [`error`]: `CliError`/`ConfigError` and their miette rendering
//! - [`logger`]: tracing subscriber on stderr
//! - [`ui`]: colored report, status messages and spinner
//!
//! ## Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | passed |
//! | 1 | failed: blocking issues, navigation or capture failure |
//! | 2 | timed out |
//! | 3 | no usable browser backend |
//! | 4 | invalid arguments or configuration |

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};
