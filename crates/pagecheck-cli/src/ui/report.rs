//! Human-readable report rendering.

use crate::ui::{format_duration, paint, severity_style, status_style};
use owo_colors::Style;
use pagecheck::{Severity, Status, ValidationReport};
use std::fmt::Write as _;

const CATEGORY_WIDTH: usize = 18;

fn status_mark(status: Status) -> &'static str {
    match status {
        Status::Passed => "✓",
        Status::Failed => "✗",
        Status::TimedOut => "⏱",
        Status::ConfigurationError => "⚠",
    }
}

/// Render the report as a colored, multi-line summary.
pub fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    let style = status_style(report.status());

    let verdict = report.status().to_string().to_uppercase();
    let _ = write!(
        out,
        "{} {}  {}",
        paint(status_mark(report.status()), style),
        paint(&verdict, style),
        report.url()
    );

    let mut facts = Vec::new();
    if let Some(backend) = report.backend() {
        facts.push(backend.to_string());
    }
    if let Some(load) = report.load_duration() {
        facts.push(format!("loaded in {}", format_duration(load)));
    }
    if !facts.is_empty() {
        let _ = write!(out, " {}", paint(format!("({})", facts.join(", ")), Style::new().dimmed()));
    }
    if report.partial() {
        let _ = write!(out, " {}", paint("[partial]", Style::new().yellow()));
    }
    out.push('\n');

    if let Some(error) = report.error() {
        let _ = writeln!(out, "  {} {error}", paint("error:", Style::new().red().bold()));
    }

    if !report.issues().is_empty() {
        out.push('\n');
    }
    for issue in report.issues() {
        let label = format!("{:<8}", issue.severity.as_str().to_uppercase());
        let _ = write!(
            out,
            "  {}  {:<width$}  {}",
            paint(label, severity_style(issue.severity)),
            issue.category.as_str(),
            issue.message,
            width = CATEGORY_WIDTH
        );
        if issue.repeat_count > 1 {
            let _ = write!(out, " {}", paint(format!("×{}", issue.repeat_count), Style::new().bold()));
        }
        if let Some(location) = &issue.location {
            let _ = write!(out, "  {}", paint(location, Style::new().dimmed()));
        }
        out.push('\n');
    }

    let summary = report.summary();
    let counts = Severity::DESCENDING
        .iter()
        .map(|severity| format!("{} {}", summary.count(*severity), severity))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = write!(
        out,
        "\n  {} issue{}: {counts}; {} blocking",
        summary.total,
        if summary.total == 1 { "" } else { "s" },
        report.blocking_count()
    );

    out
}

/// Print the rendered report to stdout.
pub fn print_report(report: &ValidationReport) {
    println!("{}", render_report(report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::init_colors;
    use chrono::Utc;
    use pagecheck::{
        aggregate, PageLoad, SessionOutcome, SignalCollector, Termination, ValidationRequest,
    };
    use pagecheck_browser::{Backend, Location, RawSignal, SignalLevel};
    use serial_test::serial;
    use std::time::Duration;

    fn report(termination: Termination, signals: Vec<RawSignal>) -> ValidationReport {
        let mut collector = SignalCollector::new(Duration::from_secs(1));
        for signal in signals {
            collector.ingest(signal);
        }
        let now = Utc::now();
        aggregate(
            ValidationRequest::new("http://localhost:3000/"),
            SessionOutcome {
                backend: Some(Backend::Cdp),
                termination,
                load: Some(PageLoad {
                    duration: Duration::from_millis(420),
                    at: now,
                }),
                signals: collector.into_signals(),
                finished_at: now,
            },
        )
    }

    #[test]
    #[serial]
    fn test_clean_report() {
        init_colors(true);
        let rendered = render_report(&report(Termination::Completed, Vec::new()));

        assert!(rendered.starts_with("✓ PASSED  http://localhost:3000/ (cdp, loaded in 420ms)"));
        assert!(rendered.ends_with("0 issues: 0 critical, 0 high, 0 medium, 0 info; 0 blocking"));
        assert!(!rendered.contains("[partial]"));
    }

    #[test]
    #[serial]
    fn test_issue_lines() {
        init_colors(true);
        let now = Utc::now();
        let warning = RawSignal::console(SignalLevel::Warning, "deprecated API").at(now);
        let rendered = render_report(&report(
            Termination::Completed,
            vec![
                RawSignal::page_error("Uncaught SyntaxError: x")
                    .with_location(Location::new("app.js").at(3, 1))
                    .at(now),
                warning.clone(),
                warning,
            ],
        ));

        assert!(rendered.starts_with("✗ FAILED"));
        assert!(rendered.contains("CRITICAL  syntax_error"));
        assert!(rendered.contains("Uncaught SyntaxError: x  app.js:3:1"));
        assert!(rendered.contains("deprecated API ×2"));
        assert!(rendered.contains("2 issues: 1 critical, 0 high, 1 medium, 0 info; 1 blocking"));
    }

    #[test]
    #[serial]
    fn test_partial_and_error() {
        init_colors(true);
        let rendered = render_report(&report(
            Termination::CaptureFailed {
                reason: "browser process terminated".to_string(),
            },
            Vec::new(),
        ));

        assert!(rendered.contains("[partial]"));
        assert!(rendered.contains("error: browser process terminated"));
    }
}
