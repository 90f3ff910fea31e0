//! Report aggregation.
//!
//! [`aggregate`] is the only way to build a [`ValidationReport`]. It turns
//! the session's outcome and collected signals into sorted issues and a
//! status, and the result is read-only from then on.

use crate::classify::{classify, classify_load, navigation_failure, ClassifiedIssue, Severity};
use crate::collector::CollectedSignal;
use crate::request::ValidationRequest;
use chrono::{DateTime, Utc};
use pagecheck_browser::Backend;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Overall verdict of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Completed with nothing at or above the fail-on severity
    Passed,
    /// Blocking issues, a navigation failure, or a capture failure
    Failed,
    /// The budget ran out
    TimedOut,
    /// No backend could be launched
    ConfigurationError,
}

impl Status {
    /// Process exit code for this status.
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            Status::Passed => 0,
            Status::Failed => 1,
            Status::TimedOut => 2,
            Status::ConfigurationError => 3,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::TimedOut => "timed out",
            Status::ConfigurationError => "configuration error",
        })
    }
}

/// How the session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The page went quiet within budget
    Completed,
    /// The budget ran out
    TimedOut,
    /// The target page could not be loaded
    NavigationFailed {
        /// What went wrong
        reason: String,
    },
    /// The driver failed or the session panicked mid-run
    CaptureFailed {
        /// What went wrong
        reason: String,
    },
    /// No backend could be launched
    NoBackend {
        /// Every launch attempt and why it failed
        reason: String,
    },
}

/// Timing of the page load, when it got that far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLoad {
    /// From navigation start until the ready condition held
    pub duration: Duration,
    /// When the ready condition held
    pub at: DateTime<Utc>,
}

/// Everything a finished session hands to the aggregator.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    /// Backend that ran the session, if one launched
    pub backend: Option<Backend>,
    /// How it ended
    pub termination: Termination,
    /// Load timing, if the page became ready
    pub load: Option<PageLoad>,
    /// Collected signals in timestamp order
    pub signals: Vec<CollectedSignal>,
    /// When the session ended
    pub finished_at: DateTime<Utc>,
}

/// Issue counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of issues
    pub total: usize,
    /// Critical issues
    pub critical: usize,
    /// High issues
    pub high: usize,
    /// Medium issues
    pub medium: usize,
    /// Informational issues
    pub info: usize,
}

impl Summary {
    fn from_issues(issues: &[ClassifiedIssue]) -> Self {
        issues.iter().fold(Self::default(), |mut summary, issue| {
            summary.total += 1;
            match issue.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Info => summary.info += 1,
            }
            summary
        })
    }

    /// Count for one severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Info => self.info,
        }
    }
}

/// The immutable result of one validation run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    #[serde(skip)]
    request: ValidationRequest,
    url: String,
    status: Status,
    backend: Option<Backend>,
    #[serde(rename = "load_duration_ms", serialize_with = "serialize_millis")]
    load_duration: Option<Duration>,
    partial: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    summary: Summary,
    issues: Vec<ClassifiedIssue>,
}

fn serialize_millis<S: Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match duration {
        Some(d) => serializer.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
        None => serializer.serialize_none(),
    }
}

impl ValidationReport {
    /// The request this report answers.
    #[must_use]
    pub fn request(&self) -> &ValidationRequest {
        &self.request
    }

    /// Target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Overall verdict.
    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Backend that ran the session; `None` if none launched.
    #[must_use]
    pub fn backend(&self) -> Option<Backend> {
        self.backend
    }

    /// Time from navigation start to the ready condition.
    #[must_use]
    pub fn load_duration(&self) -> Option<Duration> {
        self.load_duration
    }

    /// True when the run ended by timeout or capture failure.
    #[must_use]
    pub fn partial(&self) -> bool {
        self.partial
    }

    /// Description of the fatal or capture failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Issues sorted by severity (most severe first), then timestamp.
    #[must_use]
    pub fn issues(&self) -> &[ClassifiedIssue] {
        &self.issues
    }

    /// Issue counts per severity.
    #[must_use]
    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Number of high and critical issues.
    #[must_use]
    pub fn blocking_count(&self) -> usize {
        self.summary.critical + self.summary.high
    }

    /// Process exit code for this report.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.status.exit_code()
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.url, self.status)?;
        if let Some(backend) = self.backend {
            write!(f, " ({backend})")?;
        }
        if self.partial {
            f.write_str(" [partial]")?;
        }
        writeln!(f)?;

        if let Some(error) = &self.error {
            writeln!(f, "  error: {error}")?;
        }
        if let Some(load) = self.load_duration {
            writeln!(f, "  loaded in {} ms", load.as_millis())?;
        }

        for issue in &self.issues {
            write!(f, "  [{}] {}: {}", issue.severity, issue.category, issue.message)?;
            if issue.repeat_count > 1 {
                write!(f, " (x{})", issue.repeat_count)?;
            }
            if let Some(location) = &issue.location {
                write!(f, " at {location}")?;
            }
            writeln!(f)?;
        }

        write!(
            f,
            "  {} issue(s), {} blocking",
            self.summary.total,
            self.blocking_count()
        )
    }
}

/// Sorts issues by severity (descending), then timestamp (ascending).
///
/// Stable, so issues with equal keys keep their arrival order.
pub fn sort_issues(issues: &mut [ClassifiedIssue]) {
    issues.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.timestamp.cmp(&b.timestamp))
    });
}

/// Builds the report for a finished session.
#[must_use]
pub fn aggregate(request: ValidationRequest, outcome: SessionOutcome) -> ValidationReport {
    let SessionOutcome {
        backend,
        termination,
        load,
        signals,
        finished_at,
    } = outcome;

    let mut issues: Vec<ClassifiedIssue> = Vec::new();
    if let Termination::NavigationFailed { reason } = &termination {
        // The root failure stands alone; signals from an error page are noise
        issues.push(navigation_failure(&request.url, reason, finished_at));
    } else if !matches!(termination, Termination::NoBackend { .. }) {
        issues.extend(
            signals
                .iter()
                .map(|c| classify(&c.signal).with_repeat_count(c.repeat_count)),
        );
        if let Some(load) = load {
            issues.extend(classify_load(load.duration, request.slow_load, load.at));
        }
    }
    sort_issues(&mut issues);

    let blocking = issues.iter().any(|issue| issue.is_at_least(request.fail_on));
    let (status, partial, error) = match termination {
        Termination::Completed if blocking => (Status::Failed, false, None),
        Termination::Completed => (Status::Passed, false, None),
        Termination::TimedOut => (Status::TimedOut, true, None),
        Termination::NavigationFailed { reason } => (Status::Failed, false, Some(reason)),
        Termination::CaptureFailed { reason } => (Status::Failed, true, Some(reason)),
        Termination::NoBackend { reason } => (Status::ConfigurationError, false, Some(reason)),
    };

    ValidationReport {
        url: request.url.clone(),
        request,
        status,
        backend,
        load_duration: load.map(|l| l.duration),
        partial,
        error,
        summary: Summary::from_issues(&issues),
        issues,
    }
}
