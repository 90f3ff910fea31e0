#[cfg(test)]
mod tests {
    use crate::config::loading::env_key_to_field;
    use crate::config::*;
    use crate::error::{CliError, ConfigError};
    use pagecheck::Severity;
    use pagecheck_browser::{BackendSelection, ReadyCondition};
    use std::io::Write;
    use std::time::Duration;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".json")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn valid() -> PagecheckConfig {
        PagecheckConfig {
            url: Some("https://example.com".to_string()),
            ..PagecheckConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = PagecheckConfig::default();
        assert_eq!(config.budget_secs, 30);
        assert_eq!(config.backend, BackendSelection::Auto);
        assert_eq!(config.fail_on, Severity::High);
        assert_eq!(config.dedup_window_ms, 1000);
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.quiet_period_ms, 500);
        assert_eq!(config.slow_load_ms, 3000);
        assert_eq!(config.ready_state, ReadyState::Load);
        assert!(config.headless);
        assert_eq!(config.webdriver_url, "http://localhost:4444");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(valid()).unwrap();

        // camelCase field names
        assert!(json.get("budgetSecs").is_some());
        assert!(json.get("dedupWindowMs").is_some());
        assert!(json.get("budget_secs").is_none());

        // lowercase enums
        assert_eq!(json["failOn"], "high");
        assert_eq!(json["backend"], "auto");
        assert_eq!(json["readyState"], "load");

        // skip_serializing_if
        assert!(json.get("readySelector").is_none());
        assert!(json.get("chromePath").is_none());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = serde_json::from_str::<PagecheckConfig>(r#"{"url": "https://x.dev", "budget": 5}"#)
            .unwrap_err();
        assert!(err.to_string().contains("budget"));
    }

    #[test]
    fn test_env_key_to_field() {
        assert_eq!(env_key_to_field("URL"), "url");
        assert_eq!(env_key_to_field("BUDGET_SECS"), "budgetSecs");
        assert_eq!(env_key_to_field("DEDUP_WINDOW_MS"), "dedupWindowMs");
        assert_eq!(env_key_to_field("WEBDRIVER_URL"), "webdriverUrl");
        assert_eq!(env_key_to_field("FAIL_ON"), "failOn");
    }

    #[test]
    #[serial_test::serial]
    fn test_load_file_then_cli() {
        let file = config_file(
            r#"{
                "url": "https://from-file.dev",
                "budgetSecs": 12,
                "backend": "webdriver",
                "failOn": "medium",
                "readySelector": "main"
            }"#,
        );

        let from_file = PagecheckConfig::load(&ConfigOverrides::default(), Some(file.path())).unwrap();
        assert_eq!(from_file.url.as_deref(), Some("https://from-file.dev"));
        assert_eq!(from_file.budget_secs, 12);
        assert_eq!(from_file.backend, BackendSelection::WebDriver);
        assert_eq!(from_file.fail_on, Severity::Medium);
        // untouched keys keep their defaults
        assert_eq!(from_file.dedup_window_ms, 1000);

        let overrides = ConfigOverrides {
            url: Some("https://from-cli.dev".to_string()),
            budget_secs: Some(5),
            ..ConfigOverrides::default()
        };
        let merged = PagecheckConfig::load(&overrides, Some(file.path())).unwrap();
        assert_eq!(merged.url.as_deref(), Some("https://from-cli.dev"));
        assert_eq!(merged.budget_secs, 5);
        assert_eq!(merged.backend, BackendSelection::WebDriver);
        assert_eq!(merged.ready_selector.as_deref(), Some("main"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = PagecheckConfig::load(
            &ConfigOverrides::default(),
            Some(std::path::Path::new("/definitely/not/pagecheck.config.json")),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::NotFound(_))));
    }

    #[test]
    #[serial_test::serial]
    fn test_load_reports_bad_types() {
        let file = config_file(r#"{"budgetSecs": "soon"}"#);
        let err = PagecheckConfig::load(&ConfigOverrides::default(), Some(file.path())).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::Malformed(_))));
    }

    #[test]
    #[serial_test::serial]
    fn test_env_sits_between_file_and_cli() {
        let file = config_file(r#"{"url": "https://from-file.dev", "budgetSecs": 12, "slowLoadMs": 800}"#);

        // SAFETY: serialized with every other test that touches the environment
        unsafe {
            std::env::set_var("PAGECHECK_BUDGET_SECS", "20");
            std::env::set_var("PAGECHECK_FAIL_ON", "critical");
        }

        let env_only = PagecheckConfig::load(&ConfigOverrides::default(), Some(file.path()));
        let with_cli = PagecheckConfig::load(
            &ConfigOverrides {
                budget_secs: Some(3),
                ..ConfigOverrides::default()
            },
            Some(file.path()),
        );

        unsafe {
            std::env::remove_var("PAGECHECK_BUDGET_SECS");
            std::env::remove_var("PAGECHECK_FAIL_ON");
        }

        let env_only = env_only.unwrap();
        assert_eq!(env_only.budget_secs, 20);
        assert_eq!(env_only.fail_on, Severity::Critical);
        assert_eq!(env_only.slow_load_ms, 800);

        assert_eq!(with_cli.unwrap().budget_secs, 3);
    }

    #[test]
    fn test_validation() {
        assert!(valid().validate().is_ok());

        // URL is required
        let err = PagecheckConfig::default().validate().unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::MissingField { .. })));

        // Only absolute http(s) URLs
        for url in ["example.com", "ftp://example.com", "file:///etc/passwd", ""] {
            let config = PagecheckConfig {
                url: Some(url.to_string()),
                ..PagecheckConfig::default()
            };
            assert!(config.validate().is_err(), "{url}");
        }

        assert!(
            PagecheckConfig {
                budget_secs: 0,
                ..valid()
            }
            .validate()
            .is_err()
        );

        assert!(
            PagecheckConfig {
                poll_interval_ms: 0,
                ..valid()
            }
            .validate()
            .is_err()
        );

        assert!(
            PagecheckConfig {
                ready_selector: Some("  ".to_string()),
                ..valid()
            }
            .validate()
            .is_err()
        );

        assert!(
            PagecheckConfig {
                webdriver_url: "localhost".to_string(),
                ..valid()
            }
            .validate()
            .is_err()
        );

        assert!(
            PagecheckConfig {
                chrome_path: Some("/definitely/not/chrome".into()),
                ..valid()
            }
            .validate()
            .is_err()
        );

        // Zero dedup window is allowed: it disables merging
        assert!(
            PagecheckConfig {
                dedup_window_ms: 0,
                ..valid()
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_backend_settings_do_not_need_a_url() {
        assert!(PagecheckConfig::default().validate_backend_settings().is_ok());
    }

    #[test]
    fn test_ready_condition() {
        assert_eq!(valid().ready_condition(), ReadyCondition::Load);

        let dom = PagecheckConfig {
            ready_state: ReadyState::DomContentLoaded,
            ..valid()
        };
        assert_eq!(dom.ready_condition(), ReadyCondition::DomContentLoaded);

        let selector = PagecheckConfig {
            ready_selector: Some("#app".to_string()),
            ready_state: ReadyState::DomContentLoaded,
            ..valid()
        };
        assert_eq!(selector.ready_condition(), ReadyCondition::Selector("#app".to_string()));
    }

    #[test]
    fn test_to_request() {
        let config = PagecheckConfig {
            budget_secs: 7,
            backend: BackendSelection::Cdp,
            fail_on: Severity::Critical,
            dedup_window_ms: 0,
            slow_load_ms: 1200,
            ..valid()
        };
        let request = config.to_request().unwrap();

        assert_eq!(request.url, "https://example.com");
        assert_eq!(request.budget, Duration::from_secs(7));
        assert_eq!(request.backend, BackendSelection::Cdp);
        assert_eq!(request.fail_on, Severity::Critical);
        assert_eq!(request.dedup_window, Duration::ZERO);
        assert_eq!(request.slow_load, Duration::from_millis(1200));
        assert_eq!(request.poll_interval, Duration::from_millis(100));
        assert_eq!(request.quiet_period, Duration::from_millis(500));
    }

    #[test]
    fn test_browser_config() {
        let browser = valid().browser_config();
        assert!(browser.headless);
        assert!(browser.chrome_path.is_none());

        let visible = PagecheckConfig {
            headless: false,
            webdriver_url: "http://grid:4444".to_string(),
            ..valid()
        }
        .browser_config();
        assert!(!visible.headless);
        assert_eq!(visible.webdriver_url, "http://grid:4444");
    }

    #[test]
    fn test_overrides_from_args() {
        use crate::cli::{BackendArg, CheckArgs, SeverityArg};

        let args = CheckArgs {
            url: Some("https://example.com".to_string()),
            backend: Some(BackendArg::WebDriver),
            fail_on: Some(SeverityArg::Info),
            ..CheckArgs::default()
        };
        let overrides = ConfigOverrides::from(&args);
        assert_eq!(overrides.backend, Some(BackendSelection::WebDriver));
        assert_eq!(overrides.fail_on, Some(Severity::Info));
        // Not passing --visible leaves headless to the config file
        assert_eq!(overrides.headless, None);

        let json = serde_json::to_value(&overrides).unwrap();
        assert!(json.get("budgetSecs").is_none());
        assert_eq!(json["backend"], "webdriver");

        let visible = ConfigOverrides::from(&CheckArgs {
            visible: true,
            ..CheckArgs::default()
        });
        assert_eq!(visible.headless, Some(false));
    }
}
