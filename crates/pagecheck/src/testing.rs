//! Scripted in-process driver for deterministic session tests.
//!
//! A [`PageScript`] describes what a page does relative to navigation start:
//! how navigation ends, when it becomes ready, which signals it emits and
//! when, and whether the driver breaks. Time is tokio time, so tests run
//! under a paused clock.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use pagecheck_browser::{
    Backend, BrowserError, Driver, Launcher, NavigationOutcome, RawSignal, ReadyCondition, Result,
    SignalSource,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Wall-clock origin for scripted timestamps.
pub(crate) fn epoch() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
}

pub(crate) fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum Fault {
    /// Drains fail with `ProcessTerminated` from this offset on
    DrainError(Duration),
    /// Drains panic from this offset on
    DrainPanic(Duration),
}

#[derive(Debug, Clone)]
pub(crate) struct PageScript {
    navigation: NavigationOutcome,
    ready_after: Option<Duration>,
    events: Vec<(Duration, RawSignal)>,
    fault: Option<Fault>,
}

impl PageScript {
    /// A page that loads with 200, is ready after 50ms and says nothing.
    pub(crate) fn clean() -> Self {
        Self {
            navigation: NavigationOutcome::Loaded { status: Some(200) },
            ready_after: Some(ms(50)),
            events: Vec::new(),
            fault: None,
        }
    }

    pub(crate) fn navigation(mut self, outcome: NavigationOutcome) -> Self {
        self.navigation = outcome;
        self
    }

    /// `None` means the page never becomes ready.
    pub(crate) fn ready_after(mut self, after: Option<Duration>) -> Self {
        self.ready_after = after;
        self
    }

    /// Emits `signal` at `offset` after navigation start.
    pub(crate) fn emit(mut self, offset: Duration, signal: RawSignal) -> Self {
        let stamped = signal.at(epoch() + offset);
        self.events.push((offset, stamped));
        self
    }

    pub(crate) fn fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }
}

pub(crate) struct ScriptedDriver {
    backend: Backend,
    script: PageScript,
    navigated_at: Option<Instant>,
    delivered: Vec<bool>,
    shutdowns: Arc<AtomicUsize>,
    closed: bool,
}

impl ScriptedDriver {
    fn elapsed(&self) -> Option<Duration> {
        self.navigated_at.map(|start| start.elapsed())
    }

    fn check_fault(&self) -> Result<()> {
        let Some(elapsed) = self.elapsed() else {
            return Ok(());
        };
        match self.script.fault {
            Some(Fault::DrainError(after)) if elapsed >= after => Err(BrowserError::ProcessTerminated),
            Some(Fault::DrainPanic(after)) if elapsed >= after => panic!("scripted driver exploded"),
            _ => Ok(()),
        }
    }

    fn take(&mut self, network: bool) -> Result<Vec<RawSignal>> {
        if self.closed {
            return Err(BrowserError::AlreadyClosed);
        }
        self.check_fault()?;

        let Some(elapsed) = self.elapsed() else {
            return Ok(Vec::new());
        };

        let mut due = Vec::new();
        for (index, (offset, signal)) in self.script.events.iter().enumerate() {
            let is_network = signal.source == SignalSource::Network;
            if !self.delivered[index] && is_network == network && *offset <= elapsed {
                self.delivered[index] = true;
                due.push(signal.clone());
            }
        }
        Ok(due)
    }
}

#[async_trait]
impl Driver for ScriptedDriver {
    fn backend(&self) -> Backend {
        self.backend
    }

    async fn navigate(&mut self, _url: &str, _timeout: Duration) -> Result<NavigationOutcome> {
        if self.closed {
            return Err(BrowserError::AlreadyClosed);
        }
        self.navigated_at = Some(Instant::now());
        Ok(self.script.navigation.clone())
    }

    async fn is_ready(&mut self, _condition: &ReadyCondition) -> Result<bool> {
        Ok(match (self.elapsed(), self.script.ready_after) {
            (Some(elapsed), Some(after)) => elapsed >= after,
            _ => false,
        })
    }

    async fn drain_console(&mut self) -> Result<Vec<RawSignal>> {
        self.take(false)
    }

    async fn drain_network(&mut self) -> Result<Vec<RawSignal>> {
        self.take(true)
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.closed = true;
        Ok(())
    }
}

pub(crate) struct ScriptedLauncher {
    script: PageScript,
    available: Vec<Backend>,
    launch_delay: Duration,
    shutdowns: Arc<AtomicUsize>,
}

impl ScriptedLauncher {
    pub(crate) fn new(script: PageScript) -> Self {
        Self {
            script,
            available: Backend::PREFERENCE_ORDER.to_vec(),
            launch_delay: Duration::ZERO,
            shutdowns: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn with_available(mut self, backends: &[Backend]) -> Self {
        self.available = backends.to_vec();
        self
    }

    pub(crate) fn with_launch_delay(mut self, delay: Duration) -> Self {
        self.launch_delay = delay;
        self
    }

    /// Number of `shutdown` calls across every driver this launcher created.
    pub(crate) fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    pub(crate) fn driver(&self, backend: Backend) -> ScriptedDriver {
        ScriptedDriver {
            backend,
            delivered: vec![false; self.script.events.len()],
            script: self.script.clone(),
            navigated_at: None,
            shutdowns: self.shutdowns.clone(),
            closed: false,
        }
    }
}

#[async_trait]
impl Launcher for ScriptedLauncher {
    async fn launch(&self, backend: Backend) -> Result<Box<dyn Driver>> {
        tokio::time::sleep(self.launch_delay).await;
        if !self.available.contains(&backend) {
            return Err(BrowserError::BackendUnavailable {
                backend,
                hint: "not installed".to_string(),
            });
        }
        Ok(Box::new(self.driver(backend)))
    }
}
