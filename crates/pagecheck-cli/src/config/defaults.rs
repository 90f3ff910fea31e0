use pagecheck::Severity;
use pagecheck::request::{
    DEFAULT_BUDGET, DEFAULT_DEDUP_WINDOW, DEFAULT_POLL_INTERVAL, DEFAULT_QUIET_PERIOD,
    DEFAULT_SLOW_LOAD,
};
use pagecheck_browser::DEFAULT_WEBDRIVER_URL;

// Durations are stored as integers in the config file; the library
// constants stay the single source of the default values.

pub fn default_budget_secs() -> u64 {
    DEFAULT_BUDGET.as_secs()
}

pub fn default_fail_on() -> Severity {
    Severity::High
}

pub fn default_dedup_window_ms() -> u64 {
    millis(DEFAULT_DEDUP_WINDOW)
}

pub fn default_poll_interval_ms() -> u64 {
    millis(DEFAULT_POLL_INTERVAL)
}

pub fn default_quiet_period_ms() -> u64 {
    millis(DEFAULT_QUIET_PERIOD)
}

pub fn default_slow_load_ms() -> u64 {
    millis(DEFAULT_SLOW_LOAD)
}

pub fn default_headless() -> bool {
    true
}

pub fn default_webdriver_url() -> String {
    DEFAULT_WEBDRIVER_URL.to_string()
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
