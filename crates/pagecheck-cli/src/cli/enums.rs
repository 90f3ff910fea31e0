use clap::ValueEnum;

/// Which browser backend to drive
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum BackendArg {
    /// Try CDP first, then WebDriver
    #[value(name = "auto")]
    Auto,

    /// Chrome DevTools Protocol against a local Chromium-family browser
    #[value(name = "cdp")]
    Cdp,

    /// W3C WebDriver against a running driver server
    ///
    /// Start one with `geckodriver --port 4444` or `chromedriver --port=4444`.
    #[value(name = "webdriver")]
    WebDriver,
}

/// Lowest severity that fails the run
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum SeverityArg {
    /// Fail on anything, including informational messages
    #[value(name = "info")]
    Info,

    /// Fail on broken resources and slow loads as well
    #[value(name = "medium")]
    Medium,

    /// Fail on uncaught errors and failed requests (default)
    #[value(name = "high")]
    High,

    /// Fail only on syntax errors and failed navigation
    #[value(name = "critical")]
    Critical,
}

/// How the report is printed
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored summary for terminals
    #[default]
    #[value(name = "human")]
    Human,

    /// The report as JSON on stdout
    #[value(name = "json")]
    Json,
}

/// Document state that marks the page as loaded
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum ReadyStateArg {
    /// The load event fired
    #[value(name = "load")]
    Load,

    /// DOMContentLoaded fired (images and styles may still be loading)
    #[value(name = "domcontentloaded")]
    DomContentLoaded,
}
