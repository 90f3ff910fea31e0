//! Shapes returned by the injected scripts, and their conversion to signals.

use crate::driver::NavigationOutcome;
use crate::signal::{Location, NetworkDetails, RawSignal, ResourceKind, SignalLevel};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Everything the hook queued since the previous drain.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct HookBatch {
    #[serde(default)]
    console: Vec<HookConsoleEntry>,
    #[serde(default)]
    network: Vec<HookNetworkEntry>,
}

#[derive(Debug, Deserialize)]
struct HookConsoleEntry {
    source: String,
    level: String,
    message: String,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    column: Option<u32>,
    ts: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HookNetworkEntry {
    url: String,
    #[serde(default)]
    status: u16,
    #[serde(default)]
    initiator: String,
    #[serde(default)]
    from_markup: bool,
    ts: f64,
}

impl HookBatch {
    /// Splits the batch into console (including page errors) and network signals.
    pub(crate) fn into_signals(self) -> (Vec<RawSignal>, Vec<RawSignal>) {
        let console = self.console.into_iter().map(HookConsoleEntry::into_signal).collect();
        let network = self.network.into_iter().map(HookNetworkEntry::into_signal).collect();
        (console, network)
    }
}

impl HookConsoleEntry {
    fn into_signal(self) -> RawSignal {
        let signal = if self.source == "page-error" {
            RawSignal::page_error(self.message)
        } else {
            RawSignal::console(SignalLevel::from(self.level.as_str()), self.message)
        };

        let signal = match self.file.filter(|f| !f.is_empty()) {
            Some(file) => signal.with_location(Location {
                file,
                line: self.line,
                column: self.column,
            }),
            None => signal,
        };
        signal.at(from_epoch_millis(self.ts))
    }
}

impl HookNetworkEntry {
    fn into_signal(self) -> RawSignal {
        let details = NetworkDetails::new(
            self.url,
            self.status,
            ResourceKind::from_initiator(&self.initiator),
        )
        .from_markup(self.from_markup);

        RawSignal::network(details).at(from_epoch_millis(self.ts))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn from_epoch_millis(ts: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts as i64).unwrap_or_else(Utc::now)
}

/// State of the current document as seen by the navigation probe.
#[derive(Debug, Deserialize)]
pub(crate) struct NavigationProbe {
    href: String,
    #[serde(default)]
    status: Option<u16>,
    #[serde(default)]
    responded: bool,
}

impl NavigationProbe {
    /// Returns the outcome once the target document has replaced the blank
    /// tab, or `None` to keep polling.
    pub(crate) fn outcome(&self) -> Option<NavigationOutcome> {
        if self.href.starts_with("chrome-error://") || self.href.starts_with("about:neterror") {
            return Some(NavigationOutcome::NetworkError {
                reason: format!("browser displayed an error page ({})", self.href),
            });
        }

        if self.href == "about:blank" || !self.responded {
            return None;
        }

        // Browsers without `responseStatus` on navigation timing report nothing
        Some(match self.status {
            Some(status) if status > 0 => NavigationOutcome::from_status(status),
            _ => NavigationOutcome::Loaded { status: None },
        })
    }
}

/// Returns true when a WebDriver error message describes a network failure
/// rather than a broken session.
pub(crate) fn is_network_error(message: &str) -> bool {
    message.contains("net::ERR_") || message.contains("neterror") || message.contains("NS_ERROR_")
}
