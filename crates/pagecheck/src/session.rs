//! The session controller.
//!
//! A [`SessionController`] runs one [`ValidationRequest`] from launch to
//! report. It owns the [`SessionMachine`], the [`SignalCollector`] and, once
//! a backend is up, the browser itself through a [`DriverGuard`].
//!
//! # Budget
//!
//! A single deadline is fixed when the run starts. Every driver call is
//! bounded by `timeout_at(deadline)`, and the waits between polls never
//! sleep past it, so a hung browser cannot hold the run beyond its budget.
//! After a timeout the collector gets one last drain, bounded by
//! [`ValidationRequest::drain_grace`], so signals that arrived just before
//! expiry are still reported.
//!
//! # Cleanup
//!
//! The guard lives outside the session future. Whether that future returns,
//! fails, or panics, the controller releases the guard before building the
//! report, and the guard calls `shutdown` at most once.

use crate::collector::SignalCollector;
use crate::error::{Result, SessionError};
use crate::report::{aggregate, PageLoad, SessionOutcome, Termination, ValidationReport};
use crate::request::ValidationRequest;
use crate::state::{SessionMachine, SessionState};
use chrono::Utc;
use futures::FutureExt;
use pagecheck_browser::{launch_any, Backend, BrowserError, Driver, Launcher, NavigationOutcome};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::time::{sleep_until, timeout, timeout_at, Instant};
use tracing::{debug, field, info, info_span, warn, Instrument, Span};

/// Upper bound on driver shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Validates one page with the given launcher.
///
/// Never fails: every error becomes a terminal status in the report.
pub async fn validate(launcher: &dyn Launcher, request: ValidationRequest) -> ValidationReport {
    SessionController::new(launcher, request).run().await
}

/// Scoped ownership of a live driver.
///
/// [`release`](Self::release) shuts the driver down exactly once. Dropping
/// an unreleased guard logs a warning; the backend's own `Drop` is then
/// the only cleanup left.
pub struct DriverGuard {
    driver: Box<dyn Driver>,
    released: bool,
}

impl DriverGuard {
    /// Takes ownership of a launched driver.
    #[must_use]
    pub fn new(driver: Box<dyn Driver>) -> Self {
        Self {
            driver,
            released: false,
        }
    }

    /// Backend of the guarded driver.
    #[must_use]
    pub fn backend(&self) -> Backend {
        self.driver.backend()
    }

    /// The guarded driver.
    pub fn driver(&mut self) -> &mut dyn Driver {
        self.driver.as_mut()
    }

    /// Returns true once `release` has been called.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Shuts the driver down. Later calls do nothing.
    ///
    /// # Errors
    ///
    /// Returns the driver's shutdown error from the first call.
    pub async fn release(&mut self) -> pagecheck_browser::Result<()> {
        if self.released {
            return Ok(());
        }
        // Marked first so a failed or cancelled shutdown is never retried
        self.released = true;
        self.driver.shutdown().await
    }
}

impl Drop for DriverGuard {
    fn drop(&mut self) {
        if !self.released {
            warn!(
                "{} driver dropped without release - browser may be left running",
                self.driver.backend()
            );
        }
    }
}

/// Why a bounded driver call did not return a value.
enum Interrupt {
    Budget,
    Driver(BrowserError),
}

async fn bounded<T>(
    deadline: Instant,
    call: impl Future<Output = pagecheck_browser::Result<T>>,
) -> std::result::Result<T, Interrupt> {
    match timeout_at(deadline, call).await {
        Ok(result) => result.map_err(Interrupt::Driver),
        Err(_) => Err(Interrupt::Budget),
    }
}

fn capture_failed(err: &BrowserError) -> Termination {
    Termination::CaptureFailed {
        reason: err.to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

/// Drives one browser session through its lifecycle.
pub struct SessionController<'a> {
    launcher: &'a dyn Launcher,
    request: ValidationRequest,
    machine: SessionMachine,
    load: Option<PageLoad>,
}

impl<'a> SessionController<'a> {
    /// Creates a controller in the `Idle` state.
    #[must_use]
    pub fn new(launcher: &'a dyn Launcher, request: ValidationRequest) -> Self {
        Self {
            launcher,
            request,
            machine: SessionMachine::new(),
            load: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    /// Runs the session to completion and builds its report.
    pub async fn run(self) -> ValidationReport {
        let span = info_span!("session", url = %self.request.url, backend = field::Empty);
        self.run_inner().instrument(span).await
    }

    async fn run_inner(mut self) -> ValidationReport {
        let deadline = Instant::now() + self.request.budget;
        let mut collector = SignalCollector::new(self.request.dedup_window);
        let mut guard: Option<DriverGuard> = None;

        let termination = match AssertUnwindSafe(self.drive(deadline, &mut guard, &mut collector))
            .catch_unwind()
            .await
        {
            Ok(Ok(termination)) => termination,
            Ok(Err(e)) => Termination::CaptureFailed {
                reason: e.to_string(),
            },
            Err(payload) => {
                let err = SessionError::Panicked(panic_message(payload.as_ref()));
                warn!("{err}");
                Termination::CaptureFailed {
                    reason: err.to_string(),
                }
            }
        };

        if termination == Termination::TimedOut {
            if let Some(guard) = guard.as_mut() {
                self.final_drain(guard, &mut collector).await;
            }
        }

        self.finish(&termination);

        let backend = guard.as_ref().map(DriverGuard::backend);
        if let Some(guard) = guard.as_mut() {
            Self::release(guard).await;
        }

        let outcome = SessionOutcome {
            backend,
            termination,
            load: self.load,
            signals: collector.into_signals(),
            finished_at: Utc::now(),
        };
        let report = aggregate(self.request, outcome);
        info!(
            status = %report.status(),
            issues = report.issues().len(),
            partial = report.partial(),
            "session finished"
        );
        report
    }

    async fn drive(
        &mut self,
        deadline: Instant,
        slot: &mut Option<DriverGuard>,
        collector: &mut SignalCollector,
    ) -> Result<Termination> {
        self.machine.transition(SessionState::Launching)?;

        let driver = match timeout_at(deadline, launch_any(self.launcher, self.request.backend)).await
        {
            Ok(Ok(driver)) => driver,
            Ok(Err(e)) => {
                warn!("{e}");
                return Ok(Termination::NoBackend {
                    reason: e.to_string(),
                });
            }
            Err(_) => return Ok(Termination::TimedOut),
        };
        Span::current().record("backend", field::display(driver.backend()));
        let guard = slot.insert(DriverGuard::new(driver));

        self.machine.transition(SessionState::Navigating)?;
        let navigation_start = Instant::now();
        if let Some(end) = self.navigate(guard.driver(), deadline).await {
            return Ok(end);
        }
        if let Some(end) = self.await_ready(guard.driver(), deadline, collector).await {
            return Ok(end);
        }

        let duration = navigation_start.elapsed();
        self.load = Some(PageLoad {
            duration,
            at: Utc::now(),
        });
        info!(load_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX), "page ready");

        self.machine.transition(SessionState::Capturing)?;
        Ok(self.capture(guard.driver(), deadline, collector).await)
    }

    async fn navigate(&self, driver: &mut dyn Driver, deadline: Instant) -> Option<Termination> {
        let url = &self.request.url;
        let remaining = deadline.saturating_duration_since(Instant::now());

        match bounded(deadline, driver.navigate(url, remaining)).await {
            Ok(NavigationOutcome::Loaded { status }) => {
                debug!(?status, "root document received");
                None
            }
            Ok(NavigationOutcome::HttpError { status }) => Some(Termination::NavigationFailed {
                reason: format!("server responded with HTTP {status}"),
            }),
            Ok(NavigationOutcome::NetworkError { reason }) => {
                Some(Termination::NavigationFailed { reason })
            }
            Err(Interrupt::Budget) => Some(Termination::TimedOut),
            Err(Interrupt::Driver(e)) if e.is_timeout() => Some(Termination::TimedOut),
            Err(Interrupt::Driver(e @ BrowserError::NavigationFailed { .. })) => {
                Some(Termination::NavigationFailed {
                    reason: e.to_string(),
                })
            }
            Err(Interrupt::Driver(e)) => Some(capture_failed(&e)),
        }
    }

    /// Polls the collector and the ready condition until the page is ready.
    async fn await_ready(
        &self,
        driver: &mut dyn Driver,
        deadline: Instant,
        collector: &mut SignalCollector,
    ) -> Option<Termination> {
        loop {
            match bounded(deadline, collector.poll(&mut *driver)).await {
                Ok(_) => {}
                Err(Interrupt::Budget) => return Some(Termination::TimedOut),
                Err(Interrupt::Driver(e)) => return Some(capture_failed(&e)),
            }

            match bounded(deadline, driver.is_ready(&self.request.ready)).await {
                Ok(true) => return None,
                Ok(false) => {}
                Err(Interrupt::Budget) => return Some(Termination::TimedOut),
                // A document mid-load can reject evaluation; the next poll retries
                Err(Interrupt::Driver(e)) => debug!("ready check failed: {e}"),
            }

            if !self.pause(deadline).await {
                return Some(Termination::TimedOut);
            }
        }
    }

    /// Collects until the page has been quiet for the quiescence window.
    async fn capture(
        &self,
        driver: &mut dyn Driver,
        deadline: Instant,
        collector: &mut SignalCollector,
    ) -> Termination {
        let mut last_activity = Instant::now();

        loop {
            match bounded(deadline, collector.poll(&mut *driver)).await {
                Ok(0) => {}
                Ok(arrived) => {
                    debug!("{arrived} new signal(s)");
                    last_activity = Instant::now();
                }
                Err(Interrupt::Budget) => return Termination::TimedOut,
                Err(Interrupt::Driver(e)) => return capture_failed(&e),
            }

            if last_activity.elapsed() >= self.request.quiet_period {
                return Termination::Completed;
            }
            if !self.pause(deadline).await {
                return Termination::TimedOut;
            }
        }
    }

    /// Sleeps one poll interval, never past the deadline. Returns false once
    /// the deadline is reached.
    async fn pause(&self, deadline: Instant) -> bool {
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        sleep_until((now + self.request.poll_interval).min(deadline)).await;
        Instant::now() < deadline
    }

    async fn final_drain(&self, guard: &mut DriverGuard, collector: &mut SignalCollector) {
        let drain = timeout(self.request.drain_grace, collector.poll(guard.driver()));
        match AssertUnwindSafe(drain).catch_unwind().await {
            Ok(Ok(Ok(arrived))) => debug!("final drain collected {arrived} signal(s)"),
            Ok(Ok(Err(e))) => debug!("final drain failed: {e}"),
            Ok(Err(_)) => debug!("final drain exceeded {:?}", self.request.drain_grace),
            Err(_) => warn!("driver panicked during final drain"),
        }
    }

    fn finish(&mut self, termination: &Termination) {
        if self.machine.state().is_terminal() {
            return;
        }

        let terminal = match termination {
            Termination::Completed => SessionState::Completed,
            Termination::TimedOut => SessionState::TimedOut,
            Termination::NavigationFailed { .. }
            | Termination::CaptureFailed { .. }
            | Termination::NoBackend { .. } => SessionState::Failed,
        };
        if let Err(e) = self.machine.transition(terminal) {
            warn!("{e}");
        }
    }

    async fn release(guard: &mut DriverGuard) {
        let shutdown = timeout(SHUTDOWN_TIMEOUT, guard.release());
        match AssertUnwindSafe(shutdown).catch_unwind().await {
            Ok(Ok(Ok(()))) => debug!("driver released"),
            Ok(Ok(Err(e))) => warn!("driver shutdown failed: {e}"),
            Ok(Err(_)) => warn!("driver shutdown did not finish within {SHUTDOWN_TIMEOUT:?}"),
            Err(_) => warn!("driver panicked during shutdown"),
        }
    }
}
