//! Error types for the pagecheck CLI.
//!
//! A validation that runs to completion is never an error here: its verdict
//! lives in the report and the exit code. `CliError` covers what stops a run
//! from starting (bad arguments, unreadable or invalid configuration) and
//! failures writing the result.
//!
//! Every variant is rendered through miette at `main` and exits with
//! [`USAGE_EXIT_CODE`].
//!
//! # Example
//!
//! ```rust,no_run
//! use pagecheck_cli::error::{Result, ResultExt};
//! use std::io::Write;
//!
//! fn write_json(json: &str) -> Result<()> {
//!     writeln!(std::io::stdout(), "{json}")
//!         .context("Failed to write report")
//!         .with_hint("Is stdout closed?")
//! }
//! ```

mod diagnostic;

use std::path::PathBuf;
use thiserror::Error;

pub use diagnostic::cli_error_to_miette;

/// Exit code for errors that happen before a validation starts.
///
/// Report statuses use 0-3; see `pagecheck::Status::exit_code`.
pub const USAGE_EXIT_CODE: u8 = 4;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors, e.g. writing the report
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist
    #[error("Config file not found: {}\n\nHint: Create a pagecheck.config.json file or fix the --config path", .0.display())]
    NotFound(PathBuf),

    /// The merged configuration could not be deserialized
    #[error("Invalid configuration: {0}\n\nHint: Check pagecheck.config.json and PAGECHECK_* variables for typos and field types")]
    Malformed(String),

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// How to provide it
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// What a valid value looks like
        hint: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Malformed(err.to_string())
    }
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Appends a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefixes the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{err}\n\nHint: {hint}"))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{msg}: {err}"))
        })
    }
}
