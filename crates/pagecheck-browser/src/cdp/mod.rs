//! Chrome DevTools Protocol backend.
//!
//! Launches a local Chromium-family process through chromiumoxide, opens one
//! tab, and subscribes to the runtime and network domains before the first
//! navigation so nothing the page does on load is missed.
//!
//! # Resource Safety
//!
//! The browser process, the CDP handler task, the listener tasks and the
//! temporary profile directory are all released by [`Driver::shutdown`].
//! `Drop` only logs: it cannot await the close handshake, and chromiumoxide's
//! own `Browser` drop is what terminates a process that was never closed.

mod events;

use crate::capture::SignalCapture;
use crate::config::BrowserConfig;
use crate::detect::{chrome_install_hint, find_chrome};
use crate::driver::{Backend, Driver, NavigationOutcome, ReadyCondition};
use crate::error::{BrowserError, Result};
use crate::signal::RawSignal;
use crate::wait::{wait_for_value, WaitConfig};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventRequestWillBeSent, EventResponseReceived, ResourceType,
};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::cdp::js_protocol::runtime::{EventConsoleApiCalled, EventExceptionThrown};
use chromiumoxide::page::Page;
use events::RequestMeta;
use futures::{Stream, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How often `navigate` checks whether the root document response arrived.
const DOCUMENT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Status of the root document for the current navigation.
type DocumentStatus = Arc<Mutex<Option<u16>>>;

/// A CDP-driven browser session.
pub struct CdpDriver {
    browser: Option<Browser>,
    page: Option<Page>,
    console: SignalCapture,
    network: SignalCapture,
    document: DocumentStatus,
    handler: Option<JoinHandle<()>>,
    listeners: Vec<JoinHandle<()>>,
    user_data_dir: PathBuf,
}

impl CdpDriver {
    /// Launches Chromium and prepares a tab for navigation.
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` if no Chromium executable is found, or
    /// `LaunchFailed` if the process does not start or the tab cannot be
    /// instrumented. A partially started browser is shut down before the
    /// error is returned.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let executable = find_chrome(config.chrome_path.as_deref()).ok_or_else(|| {
            BrowserError::BackendUnavailable {
                backend: Backend::Cdp,
                hint: chrome_install_hint(),
            }
        })?;

        // A unique profile per session avoids ProcessSingleton conflicts when
        // several runs execute in parallel.
        let user_data_dir =
            std::env::temp_dir().join(format!("pagecheck-{}", uuid::Uuid::new_v4()));
        let chrome_config = chrome_config(config, &executable, &user_data_dir)?;

        debug!("launching {} with profile {}", executable.display(), user_data_dir.display());

        let (browser, mut handler) =
            Browser::launch(chrome_config)
                .await
                .map_err(|e| BrowserError::LaunchFailed {
                    backend: Backend::Cdp,
                    reason: "failed to launch Chrome process".to_string(),
                    source: Some(Box::new(e)),
                })?;

        // chromiumoxide only processes CDP traffic while its handler is polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler error: {e}");
                }
            }
        });

        let mut driver = Self {
            browser: Some(browser),
            page: None,
            console: SignalCapture::new(),
            network: SignalCapture::new(),
            document: Arc::new(Mutex::new(None)),
            handler: Some(handler_task),
            listeners: Vec::new(),
            user_data_dir,
        };

        if let Err(e) = driver.attach().await {
            let _ = driver.shutdown().await;
            return Err(BrowserError::LaunchFailed {
                backend: Backend::Cdp,
                reason: format!("failed to instrument tab: {e}"),
                source: Some(Box::new(e)),
            });
        }

        debug!("CDP backend ready");
        Ok(driver)
    }

    /// Opens the tab and starts the listener tasks.
    async fn attach(&mut self) -> Result<()> {
        let browser = self.browser.as_ref().ok_or(BrowserError::AlreadyClosed)?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?;

        page.execute(EnableParams::default()).await?;

        let mut console_calls = page.event_listener::<EventConsoleApiCalled>().await?;
        let mut exceptions = page.event_listener::<EventExceptionThrown>().await?;
        let console = self.console.clone();
        self.listeners.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(event) = console_calls.next() => console.push(events::console_signal(&event)),
                    Some(event) = exceptions.next() => console.push(events::exception_signal(&event)),
                    else => break,
                }
            }
        }));

        let mut requests = page.event_listener::<EventRequestWillBeSent>().await?;
        let mut responses = page.event_listener::<EventResponseReceived>().await?;
        let mut failures = page.event_listener::<EventLoadingFailed>().await?;
        let network = self.network.clone();
        let document = self.document.clone();
        self.listeners.push(tokio::spawn(async move {
            let mut in_flight: HashMap<String, RequestMeta> = HashMap::new();
            merge_network(requests, responses, failures, |event| match event {
                NetworkEvent::Request(event) => {
                    in_flight.insert(event.request_id.inner().clone(), RequestMeta::from_event(&event));
                }
                NetworkEvent::Response(event) => {
                    let meta = in_flight.remove(event.request_id.inner());
                    if event.r#type == ResourceType::Document {
                        let mut status = document.lock().unwrap_or_else(PoisonError::into_inner);
                        if status.is_none() {
                            *status = Some(u16::try_from(event.response.status).unwrap_or(0));
                        }
                    }
                    if let Some(signal) = events::response_signal(&event, meta.as_ref()) {
                        network.push(signal);
                    }
                }
                NetworkEvent::Failure(event) => {
                    let meta = in_flight.remove(event.request_id.inner());
                    if let Some(signal) = events::loading_failed_signal(&event, meta.as_ref()) {
                        network.push(signal);
                    }
                }
            })
            .await;
        }));

        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> Result<&Page> {
        self.page.as_ref().ok_or(BrowserError::AlreadyClosed)
    }

    /// Fails once the CDP connection is gone; the handler task ends with it.
    fn ensure_alive(&self) -> Result<()> {
        match &self.handler {
            Some(handler) if !handler.is_finished() => Ok(()),
            Some(_) => Err(BrowserError::ProcessTerminated),
            None => Err(BrowserError::AlreadyClosed),
        }
    }
}

/// One event from the network listener streams.
enum NetworkEvent<Q, P, F> {
    Request(Q),
    Response(P),
    Failure(F),
}

/// Feeds the three network streams to `handle` until all of them end.
///
/// chromiumoxide forwards events to listeners in the order the browser sent
/// them, and a request is announced before its response or failure. Polling
/// `requests` first therefore hands over a request's metadata before anything
/// that needs it, even when both are already queued.
async fn merge_network<Q, P, F>(
    mut requests: impl Stream<Item = Q> + Unpin,
    mut responses: impl Stream<Item = P> + Unpin,
    mut failures: impl Stream<Item = F> + Unpin,
    mut handle: impl FnMut(NetworkEvent<Q, P, F>),
) {
    loop {
        let event = tokio::select! {
            biased;
            Some(event) = requests.next() => NetworkEvent::Request(event),
            Some(event) = responses.next() => NetworkEvent::Response(event),
            Some(event) = failures.next() => NetworkEvent::Failure(event),
            else => break,
        };
        handle(event);
    }
}

/// Converts to a chromiumoxide `BrowserConfig`.
fn chrome_config(config: &BrowserConfig, executable: &Path, user_data_dir: &Path) -> Result<ChromeConfig> {
    let mut builder = ChromeConfig::builder()
        .chrome_executable(executable)
        .arg(format!("--user-data-dir={}", user_data_dir.display()))
        .arg(format!(
            "--window-size={},{}",
            config.window_size.0, config.window_size.1
        ));

    if !config.headless {
        builder = builder.with_head();
    }

    for arg in &config.args {
        builder = builder.arg(arg.clone());
    }

    builder.build().map_err(|e| BrowserError::LaunchFailed {
        backend: Backend::Cdp,
        reason: format!("invalid browser configuration: {e}"),
        source: None,
    })
}

fn is_http(url: &str) -> bool {
    url::Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

#[async_trait]
impl Driver for CdpDriver {
    fn backend(&self) -> Backend {
        Backend::Cdp
    }

    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<NavigationOutcome> {
        self.ensure_alive()?;
        let page = self.page()?.clone();
        *self.document.lock().unwrap_or_else(PoisonError::into_inner) = None;

        debug!("navigating to {url}");
        let response = page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if let Some(reason) = response.result.error_text.clone().filter(|t| !t.is_empty()) {
            return Ok(NavigationOutcome::NetworkError { reason });
        }

        // data:, about: and file: documents have no HTTP response
        if !is_http(url) {
            return Ok(NavigationOutcome::Loaded { status: None });
        }

        let document = self.document.clone();
        let status = wait_for_value(
            || {
                let document = document.clone();
                async move { Ok(*document.lock().unwrap_or_else(PoisonError::into_inner)) }
            },
            WaitConfig::new(timeout, DOCUMENT_POLL_INTERVAL),
            "root document response",
        )
        .await?;

        Ok(NavigationOutcome::from_status(status))
    }

    async fn is_ready(&mut self, condition: &ReadyCondition) -> Result<bool> {
        self.ensure_alive()?;
        let expression = condition.expression()?;
        let result = self
            .page()?
            .evaluate(expression.as_str())
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;

        Ok(result
            .value()
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false))
    }

    async fn drain_console(&mut self) -> Result<Vec<RawSignal>> {
        self.ensure_alive()?;
        Ok(self.console.drain())
    }

    async fn drain_network(&mut self) -> Result<Vec<RawSignal>> {
        self.ensure_alive()?;
        Ok(self.network.drain())
    }

    async fn shutdown(&mut self) -> Result<()> {
        for listener in self.listeners.drain(..) {
            listener.abort();
        }
        self.page = None;

        let mut result = Ok(());
        if let Some(mut browser) = self.browser.take() {
            debug!("closing CDP browser");
            if let Err(e) = browser.close().await {
                warn!("graceful close failed ({e}), killing browser process");
                if let Some(Err(kill_err)) = browser.kill().await {
                    warn!("failed to kill browser process: {kill_err}");
                }
                result = Err(BrowserError::ChromiumOxide(e));
            }
            if let Err(e) = browser.wait().await {
                debug!("waiting for browser exit failed: {e}");
            }
        }

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        if self.user_data_dir.exists() {
            if let Err(e) = tokio::fs::remove_dir_all(&self.user_data_dir).await {
                debug!("could not remove {}: {e}", self.user_data_dir.display());
            }
        }

        result
    }
}

impl Drop for CdpDriver {
    fn drop(&mut self) {
        if self.browser.is_some() {
            // chromiumoxide's Browser drop terminates the child process; we
            // can only report that the graceful path was skipped.
            warn!("CDP driver dropped without shutdown() - forcing browser exit via Drop");
        }
    }
}
