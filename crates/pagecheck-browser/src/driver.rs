//! The driver abstraction shared by every backend.
//!
//! A [`Driver`] is one live browser session. The session layer only ever
//! talks to `dyn Driver`, so the CDP and WebDriver backends are
//! interchangeable. Backends are created through a [`Launcher`]; the default
//! [`BrowserLauncher`] knows how to start both real backends and
//! [`launch_any`] walks a [`BackendSelection`] in its documented order.

use crate::cdp::CdpDriver;
use crate::config::BrowserConfig;
use crate::error::{BrowserError, Result};
use crate::signal::RawSignal;
use crate::webdriver::WebDriverDriver;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// A browser automation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Chrome DevTools Protocol (chromiumoxide, local Chromium process)
    Cdp,
    /// W3C WebDriver (fantoccini, external driver server)
    WebDriver,
}

impl Backend {
    /// Order in which `auto` selection tries backends.
    ///
    /// CDP comes first: it observes page errors and network failures from the
    /// very first byte, while the WebDriver backend relies on an injected hook.
    pub const PREFERENCE_ORDER: [Backend; 2] = [Backend::Cdp, Backend::WebDriver];
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Cdp => "cdp",
            Backend::WebDriver => "webdriver",
        })
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cdp" | "chrome" | "chromium" => Ok(Backend::Cdp),
            "webdriver" | "wd" => Ok(Backend::WebDriver),
            other => Err(format!("unknown backend '{other}' (expected cdp or webdriver)")),
        }
    }
}

/// Which backend(s) a run may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendSelection {
    /// Probe in [`Backend::PREFERENCE_ORDER`] and use the first that launches
    #[default]
    Auto,
    /// Only the CDP backend
    Cdp,
    /// Only the WebDriver backend
    WebDriver,
}

impl BackendSelection {
    /// Backends to try, in order.
    #[must_use]
    pub fn candidates(&self) -> &'static [Backend] {
        match self {
            BackendSelection::Auto => &Backend::PREFERENCE_ORDER,
            BackendSelection::Cdp => &[Backend::Cdp],
            BackendSelection::WebDriver => &[Backend::WebDriver],
        }
    }
}

impl From<Backend> for BackendSelection {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Cdp => BackendSelection::Cdp,
            Backend::WebDriver => BackendSelection::WebDriver,
        }
    }
}

/// Result of navigating to the target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The root document arrived; `status` is `None` when the backend or
    /// scheme (data:, about:) does not expose one.
    Loaded {
        /// HTTP status of the root document
        status: Option<u16>,
    },
    /// The root document answered with a non-2xx status.
    HttpError {
        /// HTTP status of the root document
        status: u16,
    },
    /// DNS, connection or TLS failure; no document was received.
    NetworkError {
        /// Browser-provided reason, e.g. `net::ERR_CONNECTION_REFUSED`
        reason: String,
    },
}

impl NavigationOutcome {
    /// Classifies a root-document HTTP status. Redirect statuses only show up
    /// here for responses the browser did not follow, which still rendered.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        if (200..400).contains(&status) {
            NavigationOutcome::Loaded {
                status: Some(status),
            }
        } else {
            NavigationOutcome::HttpError { status }
        }
    }
}

/// Condition that marks the page as loaded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "selector")]
pub enum ReadyCondition {
    /// `document.readyState === "complete"` (the load event fired)
    #[default]
    Load,
    /// `document.readyState !== "loading"` (DOMContentLoaded fired)
    DomContentLoaded,
    /// A CSS selector matches at least one element
    Selector(String),
}

impl ReadyCondition {
    /// JavaScript expression that evaluates to a boolean.
    ///
    /// # Errors
    ///
    /// Returns an error if the selector cannot be encoded.
    pub fn expression(&self) -> Result<String> {
        Ok(match self {
            ReadyCondition::Load => "document.readyState === 'complete'".to_string(),
            ReadyCondition::DomContentLoaded => "document.readyState !== 'loading'".to_string(),
            ReadyCondition::Selector(selector) => {
                // JSON encoding gives a safe JavaScript string literal
                let escaped = serde_json::to_string(selector)
                    .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;
                format!("!!document.querySelector({escaped})")
            }
        })
    }
}

impl fmt::Display for ReadyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadyCondition::Load => f.write_str("load"),
            ReadyCondition::DomContentLoaded => f.write_str("domcontentloaded"),
            ReadyCondition::Selector(selector) => write!(f, "selector '{selector}'"),
        }
    }
}

/// One live browser session.
///
/// Implementations must uphold:
/// - `drain_console`/`drain_network` never block on page activity and return
///   each signal at most once;
/// - `shutdown` releases every process and temp resource and is safe to call
///   repeatedly, including after a failure.
#[async_trait]
pub trait Driver: Send {
    /// The backend behind this session.
    fn backend(&self) -> Backend;

    /// Starts loading `url` and reports how the root document fared.
    ///
    /// Signal accumulation starts here. `timeout` bounds how long the driver
    /// may wait for the root response.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<NavigationOutcome>;

    /// Checks the ready condition without waiting.
    async fn is_ready(&mut self, condition: &ReadyCondition) -> Result<bool>;

    /// Returns console calls and uncaught page errors not drained before.
    async fn drain_console(&mut self) -> Result<Vec<RawSignal>>;

    /// Returns failed network requests not drained before.
    async fn drain_network(&mut self) -> Result<Vec<RawSignal>>;

    /// Releases the browser. Idempotent.
    async fn shutdown(&mut self) -> Result<()>;
}

/// Creates driver sessions for a given backend.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Starts a session on `backend`.
    async fn launch(&self, backend: Backend) -> Result<Box<dyn Driver>>;
}

/// Launches the real CDP and WebDriver backends.
#[derive(Debug, Clone, Default)]
pub struct BrowserLauncher {
    config: BrowserConfig,
}

impl BrowserLauncher {
    /// Creates a launcher with the given backend configuration.
    #[must_use]
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Returns the backend configuration.
    #[must_use]
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }
}

#[async_trait]
impl Launcher for BrowserLauncher {
    async fn launch(&self, backend: Backend) -> Result<Box<dyn Driver>> {
        let launch = async {
            match backend {
                Backend::Cdp => Ok(Box::new(CdpDriver::launch(&self.config).await?) as Box<dyn Driver>),
                Backend::WebDriver => {
                    Ok(Box::new(WebDriverDriver::connect(&self.config).await?) as Box<dyn Driver>)
                }
            }
        };

        tokio::time::timeout(self.config.launch_timeout, launch)
            .await
            .map_err(|_| BrowserError::LaunchFailed {
                backend,
                reason: format!("did not start within {:?}", self.config.launch_timeout),
                source: None,
            })?
    }
}

/// Launches the first backend of `selection` that starts.
///
/// # Errors
///
/// Returns `NoBackendAvailable` listing every attempt when none launched.
pub async fn launch_any(
    launcher: &dyn Launcher,
    selection: BackendSelection,
) -> Result<Box<dyn Driver>> {
    let mut attempts = Vec::new();

    for &backend in selection.candidates() {
        debug!("trying {backend} backend");
        match launcher.launch(backend).await {
            Ok(driver) => {
                info!("launched {backend} backend");
                return Ok(driver);
            }
            Err(e) => {
                debug!("{backend} backend unavailable: {e}");
                attempts.push((backend, e.to_string()));
            }
        }
    }

    Err(BrowserError::NoBackendAvailable { attempts })
}
