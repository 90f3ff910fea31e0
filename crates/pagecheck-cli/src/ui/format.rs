//! Formatting helpers for durations, severities and statuses.

use owo_colors::Style;
use pagecheck::{Severity, Status};
use std::time::Duration;

/// Renders a page load time: whole milliseconds under a second, tenths of
/// a second above.
///
/// ```
/// use std::time::Duration;
/// use pagecheck_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(420)), "420ms");
/// assert_eq!(format_duration(Duration::from_millis(3250)), "3.2s");
/// ```
pub fn format_duration(load: Duration) -> String {
    match load.as_millis() {
        ms @ 0..1000 => format!("{ms}ms"),
        ms => format!("{}.{}s", ms / 1000, (ms % 1000) / 100),
    }
}

/// Terminal style for a severity label.
pub fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::new().red().bold(),
        Severity::High => Style::new().red(),
        Severity::Medium => Style::new().yellow(),
        Severity::Info => Style::new().dimmed(),
    }
}

/// Terminal style for the verdict line.
pub fn status_style(status: Status) -> Style {
    match status {
        Status::Passed => Style::new().green().bold(),
        Status::Failed => Style::new().red().bold(),
        Status::TimedOut => Style::new().yellow().bold(),
        Status::ConfigurationError => Style::new().magenta().bold(),
    }
}
