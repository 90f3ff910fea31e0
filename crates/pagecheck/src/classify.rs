//! Signal classification.
//!
//! [`classify`] is a pure function from a [`RawSignal`] to a
//! [`ClassifiedIssue`]. Rules are checked in order and the first match wins:
//!
//! | # | Signal                                         | Category          | Severity |
//! |---|------------------------------------------------|-------------------|----------|
//! | 1 | page error that reads like a parse failure     | `syntax_error`    | critical |
//! | 2 | any other page error                           | `runtime_error`   | high     |
//! | 3 | `console.error`                                | `runtime_error`   | high     |
//! | 4 | `console.warn`                                 | `console_warning` | medium   |
//! | 5 | `console.log` / `console.info`                 | `console_log`     | info     |
//! | 6 | request with status >= 400 or no response      | `network_failure` | high     |
//! |   | ... for an image, stylesheet or script in markup | `broken_resource` | medium |
//! | 7 | anything else                                  | nearest category  | info     |
//!
//! Nothing is ever dropped. Load time is classified separately by
//! [`classify_load`].

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use pagecheck_browser::{Location, RawSignal, SignalLevel, SignalSource};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Parse-failure messages as V8, SpiderMonkey and JavaScriptCore word them.
static SYNTAX_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bSyntaxError\b|\bunexpected (token|identifier|string|number|end of (input|script)|eof)\b|invalid or unexpected token|missing [)\]}] (after|in|before)\b|\bunterminated (string|template|regular expression|comment)\b|\bexpected expression\b",
    )
    .expect("syntax error pattern compiles")
});

/// How bad an issue is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational
    Info,
    /// Worth fixing, does not fail a run by default
    Medium,
    /// Fails a run by default
    High,
    /// The page is broken
    Critical,
}

impl Severity {
    /// All severities, most severe first.
    pub const DESCENDING: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Info,
    ];

    /// Lowercase name as used in reports and configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!(
                "unknown severity '{other}' (expected info, medium, high or critical)"
            )),
        }
    }
}

/// Stable issue taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Script failed to parse
    SyntaxError,
    /// Uncaught exception or `console.error`
    RuntimeError,
    /// `console.warn`
    ConsoleWarning,
    /// `console.log` / `console.info`
    ConsoleLog,
    /// A request failed or the page itself could not be loaded
    NetworkFailure,
    /// An asset referenced by the markup failed to load
    BrokenResource,
    /// The page loaded slower than the threshold
    Performance,
}

impl IssueCategory {
    /// Snake-case name as used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCategory::SyntaxError => "syntax_error",
            IssueCategory::RuntimeError => "runtime_error",
            IssueCategory::ConsoleWarning => "console_warning",
            IssueCategory::ConsoleLog => "console_log",
            IssueCategory::NetworkFailure => "network_failure",
            IssueCategory::BrokenResource => "broken_resource",
            IssueCategory::Performance => "performance",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed defect derived from one (deduplicated) signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedIssue {
    /// Taxonomy bucket
    pub category: IssueCategory,
    /// How bad it is
    pub severity: Severity,
    /// Message text as the page produced it
    pub message: String,
    /// `file:line:column` where known
    #[serde(serialize_with = "serialize_location")]
    pub location: Option<Location>,
    /// Earliest occurrence
    pub timestamp: DateTime<Utc>,
    /// How many identical signals were merged into this issue
    pub repeat_count: u32,
    /// The signal this issue was derived from; `None` for synthetic issues
    #[serde(skip)]
    pub signal: Option<RawSignal>,
}

impl ClassifiedIssue {
    fn new(
        category: IssueCategory,
        severity: Severity,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            category,
            severity,
            message: message.into(),
            location: None,
            timestamp,
            repeat_count: 1,
            signal: None,
        }
    }

    /// Sets how many signals this issue stands for.
    #[must_use]
    pub fn with_repeat_count(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    /// Returns true if the issue is at or above `threshold`.
    #[must_use]
    pub fn is_at_least(&self, threshold: Severity) -> bool {
        self.severity >= threshold
    }
}

fn serialize_location<S: Serializer>(
    location: &Option<Location>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match location {
        Some(location) => serializer.collect_str(location),
        None => serializer.serialize_none(),
    }
}

/// Returns true if the message reads like a script parse failure.
#[must_use]
pub fn is_syntax_error(message: &str) -> bool {
    SYNTAX_ERROR.is_match(message)
}

fn rule(signal: &RawSignal) -> (IssueCategory, Severity) {
    match signal.source {
        SignalSource::PageError if is_syntax_error(&signal.message) => {
            (IssueCategory::SyntaxError, Severity::Critical)
        }
        SignalSource::PageError => (IssueCategory::RuntimeError, Severity::High),

        SignalSource::Console => match signal.level {
            SignalLevel::Error => (IssueCategory::RuntimeError, Severity::High),
            SignalLevel::Warning => (IssueCategory::ConsoleWarning, Severity::Medium),
            SignalLevel::Log | SignalLevel::Info => (IssueCategory::ConsoleLog, Severity::Info),
        },

        SignalSource::Network => match &signal.network {
            Some(details) if details.is_failure() => {
                if details.from_markup && details.resource.is_markup_asset() {
                    (IssueCategory::BrokenResource, Severity::Medium)
                } else {
                    (IssueCategory::NetworkFailure, Severity::High)
                }
            }
            // Successful or detail-less network signals carry nothing to fail on
            _ => (IssueCategory::NetworkFailure, Severity::Info),
        },
    }
}

/// Classifies one signal. Deterministic and total.
#[must_use]
pub fn classify(signal: &RawSignal) -> ClassifiedIssue {
    let (category, severity) = rule(signal);

    ClassifiedIssue {
        location: signal.location.clone(),
        signal: Some(signal.clone()),
        ..ClassifiedIssue::new(category, severity, signal.message.clone(), signal.timestamp)
    }
}

/// Classifies the page load time; `None` unless it exceeds `threshold`.
#[must_use]
pub fn classify_load(
    duration: Duration,
    threshold: Duration,
    loaded_at: DateTime<Utc>,
) -> Option<ClassifiedIssue> {
    (duration > threshold).then(|| {
        ClassifiedIssue::new(
            IssueCategory::Performance,
            Severity::Medium,
            format!(
                "page took {} ms to load (threshold {} ms)",
                duration.as_millis(),
                threshold.as_millis()
            ),
            loaded_at,
        )
    })
}

/// The single issue reported when the target page itself could not be loaded.
#[must_use]
pub fn navigation_failure(url: &str, reason: &str, at: DateTime<Utc>) -> ClassifiedIssue {
    ClassifiedIssue {
        location: Some(Location::new(url)),
        ..ClassifiedIssue::new(
            IssueCategory::NetworkFailure,
            Severity::Critical,
            format!("could not load {url}: {reason}"),
            at,
        )
    }
}
