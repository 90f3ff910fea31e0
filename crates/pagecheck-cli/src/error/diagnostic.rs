//! Miette diagnostic conversion for CLI errors.

use crate::error::{CliError, ConfigError};
use miette::Report;

/// Convert `CliError` to a miette `Report`.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        _ => miette::miette!("{}", err),
    }
}

fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::MissingField { field, hint } => {
            miette::miette!("Missing required setting '{}'\n\nHint: {}", field, hint)
        }
        ConfigError::InvalidValue { field, value, hint } => {
            miette::miette!("Invalid value for '{}': {}\n\nHint: {}", field, value, hint)
        }
        other => miette::miette!("Configuration error: {}", other),
    }
}
