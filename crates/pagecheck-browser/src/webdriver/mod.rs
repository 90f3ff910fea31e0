//! W3C WebDriver backend.
//!
//! Connects to an already running WebDriver server (chromedriver or
//! geckodriver) through fantoccini. WebDriver has no event stream, so signals
//! are collected by a hook script that wraps the console API and listens for
//! error events, plus the Resource Timing buffer for failed requests.
//!
//! On chromedriver the hook is registered through the `goog/cdp/execute`
//! passthrough as a new-document script, so it is in place before the first
//! page script runs and sees the same load-time errors as the CDP backend.
//! Servers without that endpoint get the hook on the first drain after
//! navigation; console calls and errors from before that point are lost there.
//!
//! Sessions use the `none` page load strategy: `goto` returns as soon as
//! navigation starts, and readiness is polled like on the CDP backend. That
//! lets the hook go in while the page is still loading.

mod payload;

use crate::config::BrowserConfig;
use crate::detect::{webdriver_hint, webdriver_reachable};
use crate::driver::{Backend, Driver, NavigationOutcome, ReadyCondition};
use crate::error::{BrowserError, Result};
use crate::signal::RawSignal;
use crate::wait::{wait_for_value, WaitConfig};
use async_trait::async_trait;
use fantoccini::wd::WebDriverCompatibleCommand;
use fantoccini::{Client, ClientBuilder};
use payload::{HookBatch, NavigationProbe};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Installs the hook; a no-op when it is already present.
const HOOK_INSTALL: &str = include_str!("hook.js");

/// Installs the hook if needed, then returns and clears its queues.
const DRAIN_SCRIPT: &str = concat!(include_str!("hook.js"), include_str!("drain.js"));

const NAVIGATION_PROBE: &str = r"
    var nav = performance.getEntriesByType('navigation')[0];
    return {
        href: String(location.href),
        status: nav && nav.responseStatus ? nav.responseStatus : null,
        responded: !!(nav && nav.responseEnd > 0)
    };
";

/// How often `navigate` polls for the new document.
const NAVIGATION_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to wait for the endpoint to accept a TCP connection.
const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(2);

/// Hook evaluations can fail while a document is being replaced; this many
/// failures in a row means the session is gone.
const MAX_CONSECUTIVE_HOOK_FAILURES: u32 = 3;

/// A WebDriver-driven browser session.
pub struct WebDriverDriver {
    client: Option<Client>,
    pending_console: Vec<RawSignal>,
    pending_network: Vec<RawSignal>,
    hook_failures: u32,
}

impl WebDriverDriver {
    /// Opens a new session on the configured WebDriver endpoint.
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable` when nothing listens on the endpoint and
    /// `LaunchFailed` when the server refuses to create a session.
    pub async fn connect(config: &BrowserConfig) -> Result<Self> {
        if !webdriver_reachable(&config.webdriver_url, REACHABILITY_TIMEOUT).await {
            return Err(BrowserError::BackendUnavailable {
                backend: Backend::WebDriver,
                hint: webdriver_hint(&config.webdriver_url),
            });
        }

        debug!("opening WebDriver session at {}", config.webdriver_url);
        let client = ClientBuilder::native()
            .capabilities(capabilities(config))
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| BrowserError::LaunchFailed {
                backend: Backend::WebDriver,
                reason: format!("failed to open WebDriver session: {e}"),
                source: None,
            })?;

        let (width, height) = config.window_size;
        if let Err(e) = client.set_window_size(width, height).await {
            // Headless sessions often reject window management; sizing is best-effort
            debug!("could not set window size: {e}");
        }

        match client.issue_cmd(PreloadHook).await {
            Ok(_) => debug!("hook registered for new documents"),
            Err(e) => warn!(
                "WebDriver server cannot preload scripts ({e}); console output and errors \
                 before the first drain will not be captured"
            ),
        }

        Ok(Self {
            client: Some(client),
            pending_console: Vec::new(),
            pending_network: Vec::new(),
            hook_failures: 0,
        })
    }

    fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or(BrowserError::AlreadyClosed)
    }

    /// Runs the hook, moving whatever it returns into the pending queues.
    async fn pull(&mut self) -> Result<()> {
        let outcome = self.client()?.execute(DRAIN_SCRIPT, vec![]).await;

        match outcome {
            Ok(value) => {
                self.hook_failures = 0;
                let batch: HookBatch = serde_json::from_value(value)
                    .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;
                let (console, network) = batch.into_signals();
                self.pending_console.extend(console);
                self.pending_network.extend(network);
                Ok(())
            }
            Err(e) => {
                self.hook_failures += 1;
                if self.hook_failures >= MAX_CONSECUTIVE_HOOK_FAILURES {
                    return Err(e.into());
                }
                debug!("hook evaluation failed ({}/{MAX_CONSECUTIVE_HOOK_FAILURES}): {e}", self.hook_failures);
                Ok(())
            }
        }
    }
}

/// Registers [`HOOK_INSTALL`] with `Page.addScriptToEvaluateOnNewDocument`
/// through chromedriver's CDP passthrough.
#[derive(Debug)]
struct PreloadHook;

impl WebDriverCompatibleCommand for PreloadHook {
    fn endpoint(
        &self,
        base_url: &url::Url,
        session_id: Option<&str>,
    ) -> std::result::Result<url::Url, url::ParseError> {
        // Only issued on an open session, which always has an id
        base_url
            .join(&format!("session/{}/", session_id.unwrap_or_default()))?
            .join("goog/cdp/execute")
    }

    fn method_and_body(&self, _request_url: &url::Url) -> (http::Method, Option<String>) {
        let body = json!({
            "cmd": "Page.addScriptToEvaluateOnNewDocument",
            "params": { "source": HOOK_INSTALL },
        });
        (http::Method::POST, Some(body.to_string()))
    }
}

/// Builds session capabilities understood by both chromedriver and geckodriver.
fn capabilities(config: &BrowserConfig) -> Map<String, Value> {
    let (width, height) = config.window_size;

    let mut chrome_args = config.args.clone();
    chrome_args.push(format!("--window-size={width},{height}"));
    let mut firefox_args = vec![format!("--width={width}"), format!("--height={height}")];

    if config.headless {
        chrome_args.push("--headless=new".to_string());
        firefox_args.push("-headless".to_string());
    }

    let mut caps = Map::new();
    caps.insert("pageLoadStrategy".to_string(), json!("none"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": chrome_args }));
    caps.insert("moz:firefoxOptions".to_string(), json!({ "args": firefox_args }));
    caps
}

#[async_trait]
impl Driver for WebDriverDriver {
    fn backend(&self) -> Backend {
        Backend::WebDriver
    }

    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<NavigationOutcome> {
        let client = self.client()?.clone();

        debug!("navigating to {url}");
        if let Err(e) = client.goto(url).await {
            let reason = e.to_string();
            if payload::is_network_error(&reason) {
                return Ok(NavigationOutcome::NetworkError { reason });
            }
            return Err(BrowserError::NavigationFailed {
                url: url.to_string(),
                reason,
            });
        }

        let outcome = wait_for_value(
            || {
                let client = client.clone();
                async move {
                    let value = client.execute(NAVIGATION_PROBE, vec![]).await?;
                    let probe: NavigationProbe = serde_json::from_value(value)
                        .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;
                    Ok(probe.outcome())
                }
            },
            WaitConfig::new(timeout, NAVIGATION_POLL_INTERVAL),
            "root document response",
        )
        .await?;

        // Installs the hook on servers that could not preload it
        self.pull().await?;
        Ok(outcome)
    }

    async fn is_ready(&mut self, condition: &ReadyCondition) -> Result<bool> {
        let script = format!("return {};", condition.expression()?);
        let value = self.client()?.execute(&script, vec![]).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn drain_console(&mut self) -> Result<Vec<RawSignal>> {
        self.pull().await?;
        Ok(std::mem::take(&mut self.pending_console))
    }

    async fn drain_network(&mut self) -> Result<Vec<RawSignal>> {
        self.pull().await?;
        Ok(std::mem::take(&mut self.pending_network))
    }

    async fn shutdown(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            debug!("closing WebDriver session");
            client.close().await?;
        }
        Ok(())
    }
}

impl Drop for WebDriverDriver {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            // The session lives in the driver server and would outlive us;
            // close it in the background when a runtime is still around.
            warn!("WebDriver driver dropped without shutdown() - closing session in background");
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    if let Err(e) = client.close().await {
                        warn!("background WebDriver close failed: {e}");
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_use_none_load_strategy() {
        let caps = capabilities(&BrowserConfig::default());
        assert_eq!(caps["pageLoadStrategy"], "none");

        let chrome_args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(chrome_args.iter().any(|a| a == "--headless=new"));

        let firefox_args = caps["moz:firefoxOptions"]["args"].as_array().unwrap();
        assert!(firefox_args.iter().any(|a| a == "-headless"));
        assert!(!firefox_args.iter().any(|a| a == "--no-sandbox"));
    }

    #[test]
    fn visible_sessions_are_not_headless() {
        let caps = capabilities(&BrowserConfig::default().visible());
        let chrome_args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!chrome_args.iter().any(|a| a == "--headless=new"));
    }

    #[test]
    fn preload_goes_through_the_cdp_passthrough() {
        let base = url::Url::parse("http://localhost:4444").unwrap();
        let endpoint = PreloadHook.endpoint(&base, Some("f00d")).unwrap();
        assert_eq!(
            endpoint.as_str(),
            "http://localhost:4444/session/f00d/goog/cdp/execute"
        );

        let (method, body) = PreloadHook.method_and_body(&endpoint);
        assert_eq!(method, http::Method::POST);
        let body: Value = serde_json::from_str(&body.unwrap()).unwrap();
        assert_eq!(body["cmd"], "Page.addScriptToEvaluateOnNewDocument");
        assert_eq!(body["params"]["source"], HOOK_INSTALL);
    }

    #[test]
    fn preloaded_hook_is_a_plain_script() {
        // New-document scripts run at top level, where `return` is illegal
        let top_level: Vec<_> = HOOK_INSTALL
            .lines()
            .filter(|line| !line.is_empty() && !line.starts_with(' ') && !line.starts_with("//"))
            .collect();
        assert_eq!(top_level, vec!["(function () {", "})();"]);
        assert!(HOOK_INSTALL.contains("if (window.__pagecheck) return;"));
    }

    #[test]
    fn drain_installs_before_it_reads() {
        assert!(DRAIN_SCRIPT.starts_with(HOOK_INSTALL));
        assert!(DRAIN_SCRIPT.contains("return (function"));
        assert!(DRAIN_SCRIPT.contains("state.console.splice(0)"));
    }

    #[tokio::test]
    #[ignore] // Requires a WebDriver server on localhost:4444
    async fn connect_and_shutdown() {
        let mut driver = WebDriverDriver::connect(&BrowserConfig::default())
            .await
            .expect("failed to open session");
        driver.shutdown().await.expect("shutdown");
        driver.shutdown().await.expect("second shutdown is a no-op");
    }
}
