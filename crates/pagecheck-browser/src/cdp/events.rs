//! Conversion from CDP protocol events to [`RawSignal`]s.
//!
//! The `chromiumoxide_cdp` types are serde-generated from the DevTools
//! protocol PDL files. We pattern match directly on the variants we care about
//! and fold everything else into a catch-all, so protocol additions do not
//! break the mapping.

use crate::signal::{Location, NetworkDetails, RawSignal, ResourceKind, SignalLevel};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventRequestWillBeSent, EventResponseReceived, InitiatorType, ResourceType,
};
use chromiumoxide::cdp::js_protocol::runtime::{
    ConsoleApiCalledType, EventConsoleApiCalled, EventExceptionThrown, RemoteObject, StackTrace,
};

/// What we remember about a request until it finishes or fails.
#[derive(Debug, Clone)]
pub(crate) struct RequestMeta {
    pub url: String,
    pub resource: ResourceKind,
    pub from_markup: bool,
}

impl RequestMeta {
    pub(crate) fn from_event(event: &EventRequestWillBeSent) -> Self {
        Self {
            url: event.request.url.clone(),
            resource: event
                .r#type
                .as_ref()
                .map_or(ResourceKind::Other, resource_kind),
            from_markup: matches!(event.initiator.r#type, InitiatorType::Parser),
        }
    }
}

/// Maps a CDP console API call to a signal level.
pub(crate) fn console_level(kind: &ConsoleApiCalledType) -> SignalLevel {
    match kind {
        ConsoleApiCalledType::Info => SignalLevel::Info,
        ConsoleApiCalledType::Warning => SignalLevel::Warning,
        ConsoleApiCalledType::Error | ConsoleApiCalledType::Assert => SignalLevel::Error,
        _ => SignalLevel::Log,
    }
}

/// Maps a CDP resource type onto our resource taxonomy.
pub(crate) fn resource_kind(kind: &ResourceType) -> ResourceKind {
    match kind {
        ResourceType::Document => ResourceKind::Document,
        ResourceType::Stylesheet => ResourceKind::Stylesheet,
        ResourceType::Image => ResourceKind::Image,
        ResourceType::Script => ResourceKind::Script,
        ResourceType::Font => ResourceKind::Font,
        ResourceType::Xhr | ResourceType::Fetch | ResourceType::Ping => ResourceKind::Fetch,
        _ => ResourceKind::Other,
    }
}

fn render_arg(arg: &RemoteObject) -> String {
    match &arg.value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(value) if !value.is_object() && !value.is_array() => value.to_string(),
        _ => arg
            .description
            .clone()
            .unwrap_or_else(|| "<object>".to_string()),
    }
}

// CDP line and column numbers are zero-based.
fn first_frame(stack: Option<&StackTrace>) -> Option<Location> {
    let frame = stack?.call_frames.first()?;
    if frame.url.is_empty() {
        return None;
    }
    Some(Location::new(frame.url.clone()).at(
        to_one_based(frame.line_number),
        to_one_based(frame.column_number),
    ))
}

fn to_one_based(n: i64) -> u32 {
    u32::try_from(n.saturating_add(1)).unwrap_or(0)
}

/// Parses a `Runtime.consoleAPICalled` event. Arguments are joined with spaces.
pub(crate) fn console_signal(event: &EventConsoleApiCalled) -> RawSignal {
    let text = event
        .args
        .iter()
        .map(render_arg)
        .collect::<Vec<_>>()
        .join(" ");

    let signal = RawSignal::console(console_level(&event.r#type), text);
    match first_frame(event.stack_trace.as_ref()) {
        Some(location) => signal.with_location(location),
        None => signal,
    }
}

/// Parses a `Runtime.exceptionThrown` event.
///
/// The message is `Uncaught <first line of the exception description>` when
/// the thrown value is an `Error`, otherwise the protocol's summary text.
pub(crate) fn exception_signal(event: &EventExceptionThrown) -> RawSignal {
    let details = &event.exception_details;

    let message = details
        .exception
        .as_ref()
        .and_then(|exception| {
            exception
                .description
                .as_deref()
                .and_then(|d| d.lines().next())
                .map(str::to_string)
                .or_else(|| exception.value.as_ref().map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                }))
        })
        .map_or_else(
            || details.text.clone(),
            |first| {
                if first.starts_with("Uncaught") {
                    first
                } else {
                    format!("Uncaught {first}")
                }
            },
        );

    let location = first_frame(details.stack_trace.as_ref()).or_else(|| {
        details.url.as_ref().filter(|u| !u.is_empty()).map(|url| {
            Location::new(url.clone()).at(
                to_one_based(details.line_number),
                to_one_based(details.column_number),
            )
        })
    });

    let signal = RawSignal::page_error(message);
    match location {
        Some(location) => signal.with_location(location),
        None => signal,
    }
}

/// Parses a `Network.responseReceived` event; only error statuses become signals.
pub(crate) fn response_signal(
    event: &EventResponseReceived,
    meta: Option<&RequestMeta>,
) -> Option<RawSignal> {
    let status = u16::try_from(event.response.status).unwrap_or(0);
    let details = NetworkDetails::new(
        event.response.url.clone(),
        status,
        resource_kind(&event.r#type),
    )
    .from_markup(meta.is_some_and(|m| m.from_markup));

    if !details.is_failure() {
        return None;
    }
    Some(RawSignal::network(details))
}

/// Parses a `Network.loadingFailed` event. Requests cancelled by the page
/// (navigations away, aborted fetches) are not failures.
pub(crate) fn loading_failed_signal(
    event: &EventLoadingFailed,
    meta: Option<&RequestMeta>,
) -> Option<RawSignal> {
    if event.canceled == Some(true) {
        return None;
    }

    let url = meta.map_or_else(String::new, |m| m.url.clone());
    let details = NetworkDetails::new(url.clone(), 0, resource_kind(&event.r#type))
        .from_markup(meta.is_some_and(|m| m.from_markup));

    Some(RawSignal::network(details).with_message(format!("{} {url}", event.error_text)))
}
