//! Logging setup for the pagecheck CLI.
//!
//! Installs a `tracing` subscriber with an `EnvFilter` and a compact fmt
//! layer. Logs always go to stderr so that `--format json` output on stdout
//! stays machine-readable.
//!
//! # Verbosity
//!
//! 1. `--verbose`: DEBUG for the pagecheck crates
//! 2. `--quiet`: ERROR only
//! 3. `RUST_LOG`: custom filter
//! 4. Default: INFO for the pagecheck crates, WARN for the CDP client
//!
//! # Example
//!
//! ```rust,no_run
//! use pagecheck_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("starting validation");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "pagecheck=debug,pagecheck_browser=debug,pagecheck_cli=debug,chromiumoxide=info";
const QUIET_FILTER: &str = "pagecheck=error,pagecheck_browser=error,pagecheck_cli=error";
const DEFAULT_FILTER: &str = "pagecheck=info,pagecheck_browser=info,pagecheck_cli=info,chromiumoxide=warn";

/// Picks the filter for the given flags.
///
/// `verbose` wins over `quiet`; clap already rejects the combination, this
/// only matters for library callers.
#[must_use]
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initializes the global subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initializes the global subscriber with a caller-provided filter.
///
/// ```rust,no_run
/// use pagecheck_cli::logger::init_logger_with_filter;
/// use tracing_subscriber::EnvFilter;
///
/// init_logger_with_filter(EnvFilter::new("pagecheck=trace,chromiumoxide=off"), true);
/// ```
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
