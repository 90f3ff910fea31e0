use crate::cli::{BackendArg, CheckArgs, ReadyStateArg, SeverityArg};
use crate::config::{ConfigOverrides, PagecheckConfig, ReadyState};
use crate::error::{ConfigError, Result};
use pagecheck::{Severity, ValidationRequest};
use pagecheck_browser::{BackendSelection, BrowserConfig, ReadyCondition};
use std::time::Duration;

impl From<BackendArg> for BackendSelection {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => BackendSelection::Auto,
            BackendArg::Cdp => BackendSelection::Cdp,
            BackendArg::WebDriver => BackendSelection::WebDriver,
        }
    }
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::High => Severity::High,
            SeverityArg::Critical => Severity::Critical,
        }
    }
}

impl From<ReadyStateArg> for ReadyState {
    fn from(arg: ReadyStateArg) -> Self {
        match arg {
            ReadyStateArg::Load => ReadyState::Load,
            ReadyStateArg::DomContentLoaded => ReadyState::DomContentLoaded,
        }
    }
}

impl From<&CheckArgs> for ConfigOverrides {
    fn from(args: &CheckArgs) -> Self {
        Self {
            url: args.url.clone(),
            budget_secs: args.budget,
            backend: args.backend.map(Into::into),
            fail_on: args.fail_on.map(Into::into),
            dedup_window_ms: args.dedup_window,
            slow_load_ms: args.slow_load,
            ready_selector: args.ready_selector.clone(),
            ready_state: args.ready_state.map(Into::into),
            // Only an explicit --visible overrides the config file
            headless: args.visible.then_some(false),
        }
    }
}

impl PagecheckConfig {
    /// The ready condition: a selector when one is set, the document state
    /// otherwise.
    pub fn ready_condition(&self) -> ReadyCondition {
        match (&self.ready_selector, self.ready_state) {
            (Some(selector), _) => ReadyCondition::Selector(selector.clone()),
            (None, ReadyState::Load) => ReadyCondition::Load,
            (None, ReadyState::DomContentLoaded) => ReadyCondition::DomContentLoaded,
        }
    }

    /// Builds the library request. Call [`validate`](Self::validate) first.
    pub fn to_request(&self) -> Result<ValidationRequest> {
        let url = self.url.clone().ok_or_else(|| ConfigError::MissingField {
            field: "url".to_string(),
            hint: "Pass a URL: pagecheck check https://example.com".to_string(),
        })?;

        Ok(ValidationRequest::new(url)
            .with_budget(Duration::from_secs(self.budget_secs))
            .with_backend(self.backend)
            .with_fail_on(self.fail_on)
            .with_dedup_window(Duration::from_millis(self.dedup_window_ms))
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_quiet_period(Duration::from_millis(self.quiet_period_ms))
            .with_slow_load(Duration::from_millis(self.slow_load_ms))
            .with_ready(self.ready_condition()))
    }

    /// Backend-level settings for the launcher.
    pub fn browser_config(&self) -> BrowserConfig {
        let mut config = BrowserConfig::new().with_webdriver_url(self.webdriver_url.clone());
        if !self.headless {
            config = config.visible();
        }
        if let Some(path) = &self.chrome_path {
            config = config.with_chrome_path(path.clone());
        }
        config
    }
}
