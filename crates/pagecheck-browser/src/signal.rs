//! Raw runtime signals observed in the browser.
//!
//! A [`RawSignal`] is one event as the backend saw it: a console call, an
//! uncaught page error, or a failed network request. Signals preserve their
//! source, level, timestamp and source location so that later stages can
//! deduplicate and classify them without going back to the browser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalSource {
    /// A `console.*` call made by page scripts
    Console,
    /// A network request that failed or returned an error status
    Network,
    /// An uncaught exception or unhandled rejection
    PageError,
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignalSource::Console => "console",
            SignalSource::Network => "network",
            SignalSource::PageError => "page-error",
        })
    }
}

/// The severity level a signal was emitted with.
///
/// Maps directly to JavaScript console methods; `console.debug` folds into
/// `Log` and `console.assert` failures fold into `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalLevel {
    /// `console.log()` / `console.debug()`
    Log,
    /// `console.info()`
    Info,
    /// `console.warn()`
    Warning,
    /// `console.error()`, uncaught errors, failed requests
    Error,
}

impl From<&str> for SignalLevel {
    fn from(s: &str) -> Self {
        match s {
            "info" => SignalLevel::Info,
            "warn" | "warning" => SignalLevel::Warning,
            "error" | "assert" => SignalLevel::Error,
            _ => SignalLevel::Log,
        }
    }
}

/// Source location of a signal (`file:line:column`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Script or resource URL
    pub file: String,
    /// 1-based line number, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// 1-based column number, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl Location {
    /// Creates a location for a file without line information.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
            column: None,
        }
    }

    /// Sets the line and column.
    #[must_use]
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        Ok(())
    }
}

/// What kind of resource a network request fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A top-level or frame document
    Document,
    /// A `<link rel="stylesheet">` or `@import`
    Stylesheet,
    /// An `<img>`, `<picture>` source or CSS image
    Image,
    /// A `<script>` or worker script
    Script,
    /// A web font
    Font,
    /// `fetch()`, `XMLHttpRequest` or beacon traffic
    Fetch,
    /// Anything else (media, manifests, websockets, ...)
    Other,
}

impl ResourceKind {
    /// Returns true for the asset kinds page markup typically references.
    #[must_use]
    pub fn is_markup_asset(&self) -> bool {
        matches!(
            self,
            ResourceKind::Image | ResourceKind::Stylesheet | ResourceKind::Script
        )
    }

    /// Maps a Resource Timing `initiatorType` or an element tag name.
    #[must_use]
    pub fn from_initiator(initiator: &str) -> Self {
        match initiator.to_ascii_lowercase().as_str() {
            "navigation" | "iframe" | "frame" => ResourceKind::Document,
            "link" | "stylesheet" => ResourceKind::Stylesheet,
            "img" | "image" | "picture" | "input" => ResourceKind::Image,
            "script" => ResourceKind::Script,
            "font" => ResourceKind::Font,
            "fetch" | "xmlhttprequest" | "beacon" => ResourceKind::Fetch,
            _ => ResourceKind::Other,
        }
    }
}

/// Network details attached to [`SignalSource::Network`] signals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkDetails {
    /// Requested URL
    pub url: String,
    /// HTTP status, or 0 when no response was received
    pub status: u16,
    /// Kind of resource requested
    pub resource: ResourceKind,
    /// Whether the request was initiated by the HTML parser
    pub from_markup: bool,
}

impl NetworkDetails {
    /// Creates network details for a request that was not initiated by markup.
    pub fn new(url: impl Into<String>, status: u16, resource: ResourceKind) -> Self {
        Self {
            url: url.into(),
            status,
            resource,
            from_markup: false,
        }
    }

    /// Marks the request as initiated by page markup.
    #[must_use]
    pub fn from_markup(mut self, from_markup: bool) -> Self {
        self.from_markup = from_markup;
        self
    }

    /// Returns true for error statuses and connection failures.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status == 0 || self.status >= 400
    }
}

/// A single observed runtime event.
///
/// Signals are never mutated once produced; the collector replaces rather
/// than edits them when it merges duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSignal {
    /// Where the signal came from
    pub source: SignalSource,

    /// Severity level
    pub level: SignalLevel,

    /// The formatted message text. Multiple console arguments are joined with spaces.
    pub message: String,

    /// Source location if available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    /// When the signal was observed
    pub timestamp: DateTime<Utc>,

    /// Request details for network signals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkDetails>,
}

impl RawSignal {
    /// Creates a console signal stamped with the current time.
    pub fn console(level: SignalLevel, message: impl Into<String>) -> Self {
        Self {
            source: SignalSource::Console,
            level,
            message: message.into(),
            location: None,
            timestamp: Utc::now(),
            network: None,
        }
    }

    /// Creates an uncaught page error stamped with the current time.
    pub fn page_error(message: impl Into<String>) -> Self {
        Self {
            source: SignalSource::PageError,
            level: SignalLevel::Error,
            message: message.into(),
            location: None,
            timestamp: Utc::now(),
            network: None,
        }
    }

    /// Creates a network signal stamped with the current time.
    ///
    /// The message defaults to `"<status> <url>"`, or `"failed to load <url>"`
    /// when no response was received.
    pub fn network(details: NetworkDetails) -> Self {
        let message = if details.status == 0 {
            format!("failed to load {}", details.url)
        } else {
            format!("{} {}", details.status, details.url)
        };
        let level = if details.is_failure() {
            SignalLevel::Error
        } else {
            SignalLevel::Info
        };

        Self {
            source: SignalSource::Network,
            level,
            message,
            location: Some(Location::new(details.url.clone())),
            timestamp: Utc::now(),
            network: Some(details),
        }
    }

    /// Replaces the message text.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attaches a source location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Overrides the observation timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_level_names_fold_into_four() {
        assert_eq!(SignalLevel::from("warn"), SignalLevel::Warning);
        assert_eq!(SignalLevel::from("debug"), SignalLevel::Log);
        assert_eq!(SignalLevel::from("assert"), SignalLevel::Error);
    }

    #[test]
    fn location_display() {
        assert_eq!(Location::new("app.js").to_string(), "app.js");
        assert_eq!(Location::new("app.js").at(42, 10).to_string(), "app.js:42:10");
    }

    #[test]
    fn network_signal_message_and_level() {
        let missing = RawSignal::network(NetworkDetails::new(
            "http://localhost/logo.png",
            404,
            ResourceKind::Image,
        ));
        assert_eq!(missing.message, "404 http://localhost/logo.png");
        assert_eq!(missing.level, SignalLevel::Error);

        let refused = RawSignal::network(NetworkDetails::new(
            "http://localhost/api",
            0,
            ResourceKind::Fetch,
        ));
        assert_eq!(refused.message, "failed to load http://localhost/api");
    }

    #[test]
    fn resource_kind_from_initiator() {
        assert_eq!(ResourceKind::from_initiator("IMG"), ResourceKind::Image);
        assert_eq!(ResourceKind::from_initiator("link"), ResourceKind::Stylesheet);
        assert_eq!(ResourceKind::from_initiator("xmlhttprequest"), ResourceKind::Fetch);
        assert_eq!(ResourceKind::from_initiator("css"), ResourceKind::Other);
        assert!(ResourceKind::Script.is_markup_asset());
        assert!(!ResourceKind::Fetch.is_markup_asset());
    }

    #[test]
    fn serializes_source_in_kebab_case() {
        let json = serde_json::to_value(SignalSource::PageError).unwrap();
        assert_eq!(json, "page-error");
    }
}
