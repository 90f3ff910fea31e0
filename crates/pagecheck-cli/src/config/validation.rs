use crate::config::PagecheckConfig;
use crate::error::{ConfigError, Result};
use url::Url;

/// Validate that a target URL is absolute http(s).
pub fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        field: "url".to_string(),
        value: raw.to_string(),
        hint: format!("Not a valid absolute URL ({e}); include the scheme, e.g. https://{raw}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field: "url".to_string(),
            value: raw.to_string(),
            hint: format!("Only http:// and https:// pages can be checked (got {}://)", url.scheme()),
        }
        .into());
    }

    Ok(url)
}

impl PagecheckConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        let Some(url) = &self.url else {
            return Err(ConfigError::MissingField {
                field: "url".to_string(),
                hint: "Pass it as an argument (pagecheck check https://example.com), \
                       set \"url\" in pagecheck.config.json or set PAGECHECK_URL"
                    .to_string(),
            }
            .into());
        };
        validate_url(url)?;

        self.validate_backend_settings()?;

        if self.budget_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "budgetSecs".to_string(),
                value: "0".to_string(),
                hint: "The budget must be at least 1 second".to_string(),
            }
            .into());
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pollIntervalMs".to_string(),
                value: "0".to_string(),
                hint: "Polling needs a positive interval; 100 is a good default".to_string(),
            }
            .into());
        }

        if let Some(selector) = self.ready_selector.as_deref().filter(|s| s.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "readySelector".to_string(),
                value: format!("{selector:?}"),
                hint: "Remove readySelector or give it a CSS selector such as #app".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Checks only what `pagecheck backends` needs: no URL required.
    pub fn validate_backend_settings(&self) -> Result<()> {
        let webdriver = Url::parse(&self.webdriver_url).map_err(|e| ConfigError::InvalidValue {
            field: "webdriverUrl".to_string(),
            value: self.webdriver_url.clone(),
            hint: format!("Expected an endpoint like http://localhost:4444 ({e})"),
        })?;

        if webdriver.host_str().is_none() {
            return Err(ConfigError::InvalidValue {
                field: "webdriverUrl".to_string(),
                value: self.webdriver_url.clone(),
                hint: "The WebDriver endpoint needs a host, e.g. http://localhost:4444".to_string(),
            }
            .into());
        }

        if let Some(path) = self.chrome_path.as_ref().filter(|path| !path.exists()) {
            return Err(ConfigError::InvalidValue {
                field: "chromePath".to_string(),
                value: path.display().to_string(),
                hint: "Point chromePath at a Chromium-family executable or remove it to auto-detect"
                    .to_string(),
            }
            .into());
        }

        Ok(())
    }
}
