//! Check command implementation.

use crate::cli::{CheckArgs, OutputFormat};
use crate::config::{ConfigOverrides, PagecheckConfig};
use crate::error::{Result, ResultExt};
use crate::ui;
use pagecheck::{Status, ValidationReport};
use pagecheck_browser::BrowserLauncher;
use std::io::Write;
use std::process::ExitCode;
use tracing::debug;

/// Execute the check command.
///
/// 1. Merge config file, environment and flags
/// 2. Validate the merged configuration
/// 3. Run one validation
/// 4. Print the report (human or JSON) on stdout
///
/// The exit code follows the report status.
///
/// # Errors
///
/// Returns errors for invalid configuration or when the report cannot be
/// written.
pub async fn execute(args: CheckArgs, quiet: bool) -> Result<ExitCode> {
    let config = PagecheckConfig::load(&ConfigOverrides::from(&args), args.config.as_deref())?;
    config.validate()?;
    debug!(?config, "resolved configuration");

    let request = config.to_request()?;
    let launcher = BrowserLauncher::new(config.browser_config());

    let show_spinner = args.format == OutputFormat::Human && !quiet && !ui::is_ci();
    let spinner = show_spinner.then(|| ui::Spinner::new(&format!("Checking {}", request.url)));

    let report = pagecheck::validate(&launcher, request).await;

    if let Some(spinner) = spinner {
        spinner.clear();
    }

    write_report(&report, args.format).context("Failed to write report")?;

    if report.status() == Status::ConfigurationError && args.format == OutputFormat::Human && !quiet {
        ui::info("Run 'pagecheck backends' to see what is installed");
    }

    Ok(ExitCode::from(report.exit_code()))
}

fn write_report(report: &ValidationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = report.to_json()?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
            stdout.flush()?;
        }
        OutputFormat::Human => ui::print_report(report),
    }
    Ok(())
}
