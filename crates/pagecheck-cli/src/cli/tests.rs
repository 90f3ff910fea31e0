#[cfg(test)]
mod tests {
    use crate::cli::validation::{parse_millis, parse_secs};
    use crate::cli::{BackendArg, Cli, Command, OutputFormat, ReadyStateArg, SeverityArg};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("30"), Ok(30));
        assert_eq!(parse_secs(" 5 "), Ok(5));
        assert!(parse_secs("0").is_err());
        assert!(parse_secs("-1").is_err());
        assert!(parse_secs("1.5").is_err());
        assert!(parse_secs("soon").is_err());
    }

    #[test]
    fn test_parse_millis_allows_zero() {
        assert_eq!(parse_millis("0"), Ok(0));
        assert_eq!(parse_millis("1500"), Ok(1500));
        assert!(parse_millis("1s").is_err());
    }

    #[test]
    fn test_check_defaults() {
        let cli = Cli::try_parse_from(["pagecheck", "check", "https://example.com"]).unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.url.as_deref(), Some("https://example.com"));
        assert_eq!(args.format, OutputFormat::Human);
        assert!(args.budget.is_none());
        assert!(args.backend.is_none());
        assert!(args.fail_on.is_none());
        assert!(!args.visible);
    }

    #[test]
    fn test_check_all_options() {
        let cli = Cli::try_parse_from([
            "pagecheck",
            "--no-color",
            "check",
            "http://localhost:3000",
            "--budget",
            "15",
            "--backend",
            "webdriver",
            "--fail-on",
            "medium",
            "--dedup-window",
            "0",
            "--ready-selector",
            "#app",
            "--slow-load",
            "2000",
            "--format",
            "json",
            "--config",
            "ci.json",
            "--visible",
        ])
        .unwrap();

        assert!(cli.no_color);
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.budget, Some(15));
        assert_eq!(args.backend, Some(BackendArg::WebDriver));
        assert_eq!(args.fail_on, Some(SeverityArg::Medium));
        assert_eq!(args.dedup_window, Some(0));
        assert_eq!(args.ready_selector.as_deref(), Some("#app"));
        assert_eq!(args.slow_load, Some(2000));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.config, Some(PathBuf::from("ci.json")));
        assert!(args.visible);
    }

    #[test]
    fn test_url_may_come_from_config() {
        let cli = Cli::try_parse_from(["pagecheck", "check", "--config", "site.json"]).unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert!(args.url.is_none());
    }

    #[test]
    fn test_zero_budget_is_rejected() {
        assert!(Cli::try_parse_from(["pagecheck", "check", "https://example.com", "--budget", "0"]).is_err());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(
            Cli::try_parse_from(["pagecheck", "check", "https://example.com", "--backend", "firefox"])
                .is_err()
        );
    }

    #[test]
    fn test_ready_state_conflicts_with_selector() {
        assert!(
            Cli::try_parse_from([
                "pagecheck",
                "check",
                "https://example.com",
                "--ready-selector",
                "#app",
                "--ready-state",
                "load",
            ])
            .is_err()
        );

        let cli = Cli::try_parse_from([
            "pagecheck",
            "check",
            "https://example.com",
            "--ready-state",
            "domcontentloaded",
        ])
        .unwrap();
        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.ready_state, Some(ReadyStateArg::DomContentLoaded));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["pagecheck", "-v", "-q", "backends"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pagecheck", "backends", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Backends(_)));
    }

    #[test]
    fn test_severity_values() {
        use clap::ValueEnum;

        let names: Vec<_> = SeverityArg::value_variants()
            .iter()
            .map(|v| v.to_possible_value().unwrap().get_name().to_string())
            .collect();
        assert_eq!(names, vec!["info", "medium", "high", "critical"]);
    }
}
