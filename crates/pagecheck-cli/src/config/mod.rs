//! Configuration with multi-source loading.
//!
//! Merges settings from CLI args, environment variables and a config file.
//! Priority: CLI > Environment (`PAGECHECK_*`) > File > Defaults

mod conversions;
mod defaults;
mod loading;
mod tests;
mod validation;

use pagecheck::Severity;
use pagecheck_browser::BackendSelection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use defaults::*;
pub use loading::{CONFIG_FILE, ENV_PREFIX};

/// Document state that marks the page as loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    /// The load event fired
    #[default]
    Load,
    /// DOMContentLoaded fired
    DomContentLoaded,
}

/// pagecheck configuration, loaded from pagecheck.config.json, the
/// environment and CLI args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PagecheckConfig {
    /// Page to validate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Wall-clock budget in seconds
    #[serde(default = "default_budget_secs")]
    pub budget_secs: u64,

    /// Backend selection (auto, cdp, webdriver)
    #[serde(default)]
    pub backend: BackendSelection,

    /// Lowest severity that fails the run
    #[serde(default = "default_fail_on")]
    pub fail_on: Severity,

    /// Dedup window in milliseconds; 0 disables merging
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,

    /// How often the collector drains the driver
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Silence that ends capture
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,

    /// Loads slower than this are reported
    #[serde(default = "default_slow_load_ms")]
    pub slow_load_ms: u64,

    /// CSS selector that must match before the page counts as loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_selector: Option<String>,

    /// Document state used when no selector is set
    #[serde(default)]
    pub ready_state: ReadyState,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Chromium executable for the CDP backend (auto-detected when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,

    /// WebDriver server endpoint
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
}

impl Default for PagecheckConfig {
    fn default() -> Self {
        Self {
            url: None,
            budget_secs: default_budget_secs(),
            backend: BackendSelection::Auto,
            fail_on: default_fail_on(),
            dedup_window_ms: default_dedup_window_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            quiet_period_ms: default_quiet_period_ms(),
            slow_load_ms: default_slow_load_ms(),
            ready_selector: None,
            ready_state: ReadyState::Load,
            headless: default_headless(),
            chrome_path: None,
            webdriver_url: default_webdriver_url(),
        }
    }
}

/// Settings given on the command line. Unset fields do not override
/// lower-priority sources.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedup_window_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slow_load_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_state: Option<ReadyState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headless: Option<bool>,
}
