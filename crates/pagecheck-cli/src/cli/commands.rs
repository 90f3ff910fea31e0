use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::enums::*;
use crate::cli::validation::{parse_millis, parse_secs};

/// Available pagecheck subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a page
    ///
    /// Loads the URL, waits until it is ready and quiet, and reports every
    /// console message, uncaught error and failed request it saw.
    Check(CheckArgs),

    /// Show which browser backends are available
    ///
    /// Looks for a Chromium-family executable (CDP) and a listening WebDriver
    /// server, without launching anything.
    Backends(BackendsArgs),
}

/// Arguments for the check command
///
/// Every option left unset falls back to `pagecheck.config.json`, then to
/// `PAGECHECK_*` environment variables, then to the built-in default.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Page to validate (http:// or https://)
    ///
    /// May be omitted when the config file or PAGECHECK_URL provides one.
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Wall-clock budget for the whole run, in seconds
    #[arg(short, long, value_name = "SECS", value_parser = parse_secs)]
    pub budget: Option<u64>,

    /// Browser backend
    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    /// Lowest severity that makes the run fail
    #[arg(long, value_enum, value_name = "SEVERITY")]
    pub fail_on: Option<SeverityArg>,

    /// Collapse identical messages seen within this many milliseconds (0 disables)
    #[arg(long, value_name = "MS", value_parser = parse_millis)]
    pub dedup_window: Option<u64>,

    /// CSS selector that must match before the page counts as loaded
    #[arg(long, value_name = "SELECTOR")]
    pub ready_selector: Option<String>,

    /// Document state that marks the page as loaded
    #[arg(long, value_enum, conflicts_with = "ready_selector")]
    pub ready_state: Option<ReadyStateArg>,

    /// Report loads slower than this many milliseconds
    #[arg(long, value_name = "MS", value_parser = parse_millis)]
    pub slow_load: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Path to a config file (defaults to ./pagecheck.config.json if present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub visible: bool,
}

/// Arguments for the backends command
#[derive(Args, Debug, Default)]
pub struct BackendsArgs {
    /// Path to a config file (defaults to ./pagecheck.config.json if present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
