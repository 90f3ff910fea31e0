//! What to validate and how.

use crate::classify::Severity;
use pagecheck_browser::{BackendSelection, ReadyCondition};
use std::time::Duration;

/// Default wall-clock budget for a run (30 seconds).
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(30);

/// Default window in which identical signals collapse (1 second).
pub const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_millis(1000);

/// Default interval between collector polls (100ms).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default silence that ends capture (500ms).
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Default load time above which a performance issue is reported (3 seconds).
pub const DEFAULT_SLOW_LOAD: Duration = Duration::from_secs(3);

/// Default bound on the final drain after the budget ran out (500ms).
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// One validation run's parameters. Immutable once handed to the controller.
///
/// # Example
///
/// ```
/// use pagecheck::{Severity, ValidationRequest};
/// use std::time::Duration;
///
/// let request = ValidationRequest::new("http://localhost:3000")
///     .with_budget(Duration::from_secs(10))
///     .with_fail_on(Severity::Medium);
/// assert_eq!(request.budget, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    /// Page to load
    pub url: String,
    /// Wall-clock budget covering launch, navigation and capture
    pub budget: Duration,
    /// Condition that marks the page as loaded
    pub ready: ReadyCondition,
    /// Backend to use, or `Auto`
    pub backend: BackendSelection,
    /// Lowest severity that fails the run
    pub fail_on: Severity,
    /// Identical signals closer together than this are merged; zero disables merging
    pub dedup_window: Duration,
    /// Interval between collector polls
    pub poll_interval: Duration,
    /// Capture ends after this long without new signals
    pub quiet_period: Duration,
    /// Load time above which a performance issue is reported
    pub slow_load: Duration,
    /// Bound on the last drain after the budget ran out
    pub drain_grace: Duration,
}

impl ValidationRequest {
    /// Creates a request with default settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            budget: DEFAULT_BUDGET,
            ready: ReadyCondition::default(),
            backend: BackendSelection::default(),
            fail_on: Severity::High,
            dedup_window: DEFAULT_DEDUP_WINDOW,
            poll_interval: DEFAULT_POLL_INTERVAL,
            quiet_period: DEFAULT_QUIET_PERIOD,
            slow_load: DEFAULT_SLOW_LOAD,
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }

    /// Sets the wall-clock budget.
    #[must_use]
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Sets the ready condition.
    #[must_use]
    pub fn with_ready(mut self, ready: ReadyCondition) -> Self {
        self.ready = ready;
        self
    }

    /// Selects the backend.
    #[must_use]
    pub fn with_backend(mut self, backend: impl Into<BackendSelection>) -> Self {
        self.backend = backend.into();
        self
    }

    /// Sets the lowest severity that fails the run.
    #[must_use]
    pub fn with_fail_on(mut self, fail_on: Severity) -> Self {
        self.fail_on = fail_on;
        self
    }

    /// Sets the dedup window.
    #[must_use]
    pub fn with_dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }

    /// Sets the collector poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the quiescence window.
    #[must_use]
    pub fn with_quiet_period(mut self, quiet: Duration) -> Self {
        self.quiet_period = quiet;
        self
    }

    /// Sets the performance threshold.
    #[must_use]
    pub fn with_slow_load(mut self, threshold: Duration) -> Self {
        self.slow_load = threshold;
        self
    }

    /// Sets the bound on the final drain after a timeout.
    #[must_use]
    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }
}
