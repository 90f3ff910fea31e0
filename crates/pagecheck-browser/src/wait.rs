//! Bounded polling helpers for browser conditions.
//!
//! Drivers wait for things that only the browser knows about: the root
//! document response arriving, a navigation entry appearing, a hook being
//! installed. Every wait is a check-and-sleep loop bounded by a timeout, so a
//! caller can always get control back.
//!
//! Timing uses `tokio::time::Instant`, which makes these loops deterministic
//! under a paused test clock.

use crate::error::{BrowserError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// How long to keep polling and how often.
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    /// Maximum time to wait for the condition.
    pub timeout: Duration,
    /// Pause between two probes.
    pub poll_interval: Duration,
}

impl WaitConfig {
    /// Creates a wait bounded by `timeout` that probes every `poll_interval`.
    #[must_use]
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

/// Polls `probe` until it yields a value.
///
/// The probe returns `Ok(Some(value))` when the condition holds and
/// `Ok(None)` to keep waiting. Probe errors are treated as transient (a page
/// mid-navigation routinely rejects script evaluation) and polling continues.
/// The last sleep is shortened so the call returns at the deadline.
///
/// # Errors
///
/// Returns `WaitTimeout` naming `description` if no value arrived within
/// `config.timeout`.
pub async fn wait_for_value<T, F, Fut>(
    probe: F,
    config: WaitConfig,
    description: &str,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let deadline = Instant::now() + config.timeout;

    loop {
        match probe().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => tracing::trace!("transient error while waiting for {description}: {e}"),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(BrowserError::WaitTimeout {
                condition: description.to_string(),
                timeout: config.timeout,
            });
        }

        sleep(config.poll_interval.min(deadline - now)).await;
    }
}
