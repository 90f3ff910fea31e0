//! # pagecheck
//!
//! Runtime validation of a live web page.
//!
//! Given a URL, pagecheck launches a browser through `pagecheck-browser`,
//! loads the page, listens for everything a developer would otherwise find
//! in the devtools console, and returns an immutable [`ValidationReport`]
//! with a verdict.
//!
//! ## Pipeline
//!
//! ```text
//! SessionController --launch--> Driver --drain--> SignalCollector
//!        |                                              |
//!        |                                         into_signals
//!        v                                              v
//!   DriverGuard::release          classify --> aggregate --> ValidationReport
//! ```
//!
//! - **SessionController**: explicit state machine
//!   (`Idle -> Launching -> Navigating -> Capturing -> Completed | Failed | TimedOut`)
//!   bounded by one wall-clock budget
//! - **SignalCollector**: append-only buffer, deduplicated at handover
//! - **classify**: pure rule table from signal to category and severity
//! - **aggregate**: sorts issues and decides the status
//!
//! ## Example Usage
//!
//! ```ignore
//! use pagecheck::{validate, ValidationRequest};
//! use pagecheck_browser::{BrowserConfig, BrowserLauncher};
//! use std::time::Duration;
//!
//! let launcher = BrowserLauncher::new(BrowserConfig::default());
//! let request = ValidationRequest::new("http://localhost:3000")
//!     .with_budget(Duration::from_secs(15));
//!
//! let report = validate(&launcher, request).await;
//! println!("{report}");
//! std::process::exit(report.exit_code().into());
//! ```
//!
//! ## Testing Strategy
//!
//! Session behavior is tested against a scripted in-process driver under
//! tokio's paused clock, so timeouts and quiescence are deterministic.
//! Real-browser runs live in `tests/integration.rs` and are `#[ignore]`d.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod collector;
pub mod error;
pub mod report;
pub mod request;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use classify::{classify, classify_load, ClassifiedIssue, IssueCategory, Severity};
pub use collector::{CollectedSignal, SignalCollector};
pub use error::{Result, SessionError};
pub use report::{aggregate, PageLoad, SessionOutcome, Status, Summary, Termination, ValidationReport};
pub use request::ValidationRequest;
pub use session::{validate, DriverGuard, SessionController};
pub use state::{SessionMachine, SessionState};
