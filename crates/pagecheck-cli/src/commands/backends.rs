//! Backends command implementation.
//!
//! Probes each backend in the order `auto` would try them, without
//! launching a browser.

use crate::cli::BackendsArgs;
use crate::config::{ConfigOverrides, PagecheckConfig};
use crate::error::Result;
use crate::ui;
use pagecheck::Status;
use pagecheck_browser::probe_backends;
use std::process::ExitCode;

/// Execute the backends command.
///
/// Exits 0 when at least one backend is usable, otherwise with the
/// configuration-error code a `check` would end with.
///
/// # Errors
///
/// Returns errors for an unreadable or invalid config file.
pub async fn execute(args: BackendsArgs) -> Result<ExitCode> {
    let config = PagecheckConfig::load(&ConfigOverrides::default(), args.config.as_deref())?;
    config.validate_backend_settings()?;

    let statuses = probe_backends(&config.browser_config()).await;

    for status in &statuses {
        let line = format!("{:<10} {}", status.backend.to_string(), status.detail);
        if status.available {
            ui::success(&line);
        } else {
            ui::warning(&line);
        }
    }

    match statuses.iter().find(|status| status.available) {
        Some(first) => {
            ui::info(&format!("auto selects {}", first.backend));
            Ok(ExitCode::SUCCESS)
        }
        None => {
            ui::error("no browser backend is available");
            Ok(ExitCode::from(Status::ConfigurationError.exit_code()))
        }
    }
}
