//! Command-line interface definition.
//!
//! # Command Structure
//!
//! - `pagecheck check <URL>` - validate one page and print the report
//! - `pagecheck backends` - show which browser backends are usable here

mod commands;
pub mod enums;
mod tests;
mod validation;

use clap::Parser;

pub use commands::{BackendsArgs, CheckArgs, Command};
pub use enums::*;
pub use validation::{parse_millis, parse_secs};

/// pagecheck - runtime validation of a live web page
#[derive(Parser, Debug)]
#[command(
    name = "pagecheck",
    version,
    about = "Load a page in a headless browser and report what went wrong",
    long_about = "pagecheck loads a URL in a headless browser, collects console messages,\n\
                  uncaught errors and failed requests, classifies them by severity and\n\
                  exits non-zero when the page should not ship.\n\n\
                  Exit codes: 0 passed, 1 failed, 2 timed out, 3 no usable browser,\n\
                  4 invalid arguments or configuration."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors and the report itself
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
