//! Error types for browser driver operations.
//!
//! This module separates the failure modes the session layer has to react to
//! differently: a backend that cannot be launched at all, a navigation that
//! failed, a wait that ran out of time, and a driver that stopped answering
//! mid-run. Each variant carries enough context to be reported verbatim.

use crate::driver::Backend;
use std::time::Duration;
use thiserror::Error;

/// The main error type for all driver operations.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Failed to launch the browser process or open a session.
    #[error("failed to launch {backend} backend: {reason}")]
    LaunchFailed {
        /// Backend that was being launched
        backend: Backend,
        /// Human-readable reason for the launch failure
        reason: String,
        /// Optional underlying error that caused the failure
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend is not installed or not reachable on this host.
    #[error("{backend} backend is not available: {hint}")]
    BackendUnavailable {
        /// Backend that was probed
        backend: Backend,
        /// Install or configuration hint
        hint: String,
    },

    /// Every candidate backend failed to launch.
    #[error("no usable browser backend: {}", format_attempts(.attempts))]
    NoBackendAvailable {
        /// Each backend tried, in probe order, with the reason it failed
        attempts: Vec<(Backend, String)>,
    },

    /// Failed to talk to the browser over its control channel.
    #[error("browser connection failed: {0}")]
    ConnectionFailed(String),

    /// Navigation to a URL could not be issued.
    #[error("navigation to '{url}' failed: {reason}")]
    NavigationFailed {
        /// The URL that failed to load
        url: String,
        /// Reason for the navigation failure
        reason: String,
    },

    /// A wait condition was not satisfied within the timeout.
    #[error("wait condition '{condition}' timed out after {timeout:?}")]
    WaitTimeout {
        /// Description of the condition that timed out
        condition: String,
        /// How long we waited before timing out
        timeout: Duration,
    },

    /// JavaScript execution in the page context failed.
    #[error("JavaScript execution failed: {0}")]
    ScriptExecutionFailed(String),

    /// The browser process crashed or was killed unexpectedly.
    #[error("browser process terminated unexpectedly")]
    ProcessTerminated,

    /// An operation was attempted on a driver that has been shut down.
    #[error("browser session is already closed")]
    AlreadyClosed,

    /// Wraps errors from the chromiumoxide library.
    #[error("chromiumoxide error: {0}")]
    ChromiumOxide(#[from] chromiumoxide::error::CdpError),

    /// Wraps errors from the fantoccini WebDriver client.
    #[error("WebDriver error: {0}")]
    WebDriver(String),

    /// Generic I/O errors (profile directories, sockets, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrowserError {
    /// Returns true if this error means the run ran out of time rather than failed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserError::WaitTimeout { .. })
    }
}

impl From<fantoccini::error::CmdError> for BrowserError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        BrowserError::WebDriver(err.to_string())
    }
}

fn format_attempts(attempts: &[(Backend, String)]) -> String {
    if attempts.is_empty() {
        return "no backend was selected".to_string();
    }

    attempts
        .iter()
        .map(|(backend, reason)| format!("{backend}: {reason}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// A specialized Result type for driver operations.
pub type Result<T> = std::result::Result<T, BrowserError>;
