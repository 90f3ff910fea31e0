//! # pagecheck-browser
//!
//! Backend-agnostic browser drivers for runtime page validation.
//!
//! This crate launches a browser, navigates it, and hands back the raw
//! runtime signals a page produced: console calls, uncaught page errors and
//! failed network requests. It knows nothing about sessions, budgets or
//! verdicts; those live in the `pagecheck` crate.
//!
//! ## Architecture
//!
//! - **Driver**: one live browser session behind an object-safe trait
//! - **Launcher**: creates drivers for a [`Backend`]; [`launch_any`] walks the
//!   preference order
//! - **CdpDriver**: Chrome DevTools Protocol backend (chromiumoxide)
//! - **WebDriverDriver**: W3C WebDriver backend (fantoccini)
//! - **SignalCapture**: thread-safe queue that event handlers push into
//! - **WaitConfig**: bounded polling with timeouts
//!
//! ## Backends
//!
//! | Backend     | Needs                          | Observes from                |
//! |-------------|--------------------------------|------------------------------|
//! | `cdp`       | Chrome/Chromium on this host   | first byte                   |
//! | `webdriver` | chromedriver                   | document creation            |
//! | `webdriver` | other WebDriver servers        | first drain after navigation |
//!
//! On chromedriver the WebDriver hook is preloaded into every new document.
//! Elsewhere it goes in after navigation; resource failures from before that
//! are recovered from the Resource Timing buffer, console output is not.
//!
//! ## Example Usage
//!
//! ```ignore
//! use pagecheck_browser::{launch_any, BackendSelection, BrowserConfig, BrowserLauncher, ReadyCondition};
//! use std::time::Duration;
//!
//! let launcher = BrowserLauncher::new(BrowserConfig::default());
//! let mut driver = launch_any(&launcher, BackendSelection::Auto).await?;
//!
//! driver.navigate("http://localhost:3000", Duration::from_secs(10)).await?;
//! while !driver.is_ready(&ReadyCondition::Load).await? {
//!     tokio::time::sleep(Duration::from_millis(100)).await;
//! }
//!
//! let console = driver.drain_console().await?;
//! let network = driver.drain_network().await?;
//! driver.shutdown().await?;
//! ```
//!
//! ## Testing Strategy
//!
//! Unit tests cover event conversion, hook payload parsing and wait logic
//! without a browser. Integration tests in `tests/` need Chrome (or a
//! WebDriver server) and are `#[ignore]`d; run them with
//! `cargo test -p pagecheck-browser -- --ignored`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capture;
pub mod cdp;
pub mod config;
pub mod detect;
pub mod driver;
pub mod error;
pub mod signal;
pub mod wait;
pub mod webdriver;

// Re-export main types for convenience
pub use capture::SignalCapture;
pub use cdp::CdpDriver;
pub use config::{BrowserConfig, DEFAULT_WEBDRIVER_URL};
pub use detect::{find_chrome, probe_backends, BackendStatus};
pub use driver::{
    launch_any, Backend, BackendSelection, BrowserLauncher, Driver, Launcher, NavigationOutcome,
    ReadyCondition,
};
pub use error::{BrowserError, Result};
pub use signal::{Location, NetworkDetails, RawSignal, ResourceKind, SignalLevel, SignalSource};
pub use wait::{wait_for_value, WaitConfig};
pub use webdriver::WebDriverDriver;
