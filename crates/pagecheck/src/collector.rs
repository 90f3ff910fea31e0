//! Signal collection and deduplication.
//!
//! The collector owns the session's signal buffer. It pulls from the driver
//! on each poll and appends; it never classifies. Merging happens once, at
//! handover, over the timestamp-sorted buffer, so the result does not depend
//! on the order in which the backends delivered signals.
//!
//! Two signals are repeats when they share source, level, message and
//! location, and the later one falls within the dedup window of the previous
//! occurrence. A page that logs the same warning every 200ms for a minute
//! with a 1s window therefore produces one entry; one that logs it every 5s
//! produces one entry per occurrence.

use chrono::{DateTime, TimeDelta, Utc};
use pagecheck_browser::{BrowserError, Driver, Location, RawSignal, SignalLevel, SignalSource};
use std::collections::HashMap;
use std::time::Duration;

type DedupKey = (SignalSource, SignalLevel, String, Option<Location>);

/// A signal together with how many times it was seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedSignal {
    /// Earliest occurrence
    pub signal: RawSignal,
    /// Number of raw signals merged into this entry (at least 1)
    pub repeat_count: u32,
    last_seen: DateTime<Utc>,
}

impl CollectedSignal {
    fn new(signal: RawSignal) -> Self {
        Self {
            last_seen: signal.timestamp,
            signal,
            repeat_count: 1,
        }
    }

    /// Timestamp of the latest merged occurrence.
    #[must_use]
    pub fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }
}

/// Append-only signal buffer with deduplicating handover.
#[derive(Debug)]
pub struct SignalCollector {
    window: Option<TimeDelta>,
    buffer: Vec<RawSignal>,
}

impl SignalCollector {
    /// Creates a collector; a zero `window` disables merging.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        let window = if window.is_zero() {
            None
        } else {
            Some(TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX))
        };

        Self {
            window,
            buffer: Vec::new(),
        }
    }

    /// Appends one signal.
    pub fn ingest(&mut self, signal: RawSignal) {
        self.buffer.push(signal);
    }

    /// Drains both driver queues into the buffer.
    ///
    /// Returns how many raw signals arrived.
    ///
    /// # Errors
    ///
    /// Propagates driver failures; signals ingested before the failure stay
    /// in the buffer.
    pub async fn poll(&mut self, driver: &mut dyn Driver) -> Result<usize, BrowserError> {
        let console = driver.drain_console().await?;
        let mut arrived = console.len();
        self.buffer.extend(console);

        let network = driver.drain_network().await?;
        arrived += network.len();
        self.buffer.extend(network);

        Ok(arrived)
    }

    /// Number of raw signals collected so far.
    #[must_use]
    pub fn received(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Consumes the collector, returning merged entries in timestamp order.
    #[must_use]
    pub fn into_signals(self) -> Vec<CollectedSignal> {
        let mut buffer = self.buffer;
        // Stable: equal timestamps keep arrival order
        buffer.sort_by_key(|signal| signal.timestamp);

        let Some(window) = self.window else {
            return buffer.into_iter().map(CollectedSignal::new).collect();
        };

        let mut entries: Vec<CollectedSignal> = Vec::new();
        let mut open: HashMap<DedupKey, usize> = HashMap::new();

        for signal in buffer {
            let key = (
                signal.source,
                signal.level,
                signal.message.clone(),
                signal.location.clone(),
            );

            if let Some(&index) = open.get(&key) {
                let entry = &mut entries[index];
                let within = entry
                    .last_seen
                    .checked_add_signed(window)
                    .is_none_or(|limit| signal.timestamp <= limit);
                if within {
                    entry.repeat_count += 1;
                    entry.last_seen = signal.timestamp;
                    continue;
                }
            }

            open.insert(key, entries.len());
            entries.push(CollectedSignal::new(signal));
        }

        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    fn warn(message: &str, ms: i64) -> RawSignal {
        RawSignal::console(SignalLevel::Warning, message).at(at(ms))
    }

    fn collect(window: Duration, signals: impl IntoIterator<Item = RawSignal>) -> Vec<CollectedSignal> {
        let mut collector = SignalCollector::new(window);
        for signal in signals {
            collector.ingest(signal);
        }
        collector.into_signals()
    }

    #[test]
    fn identical_signals_collapse() {
        let signals = collect(Duration::from_secs(1), (0..50).map(|i| warn("deprecated", i)));

        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].repeat_count, 50);
        assert_eq!(signals[0].signal.timestamp, at(0));
        assert_eq!(signals[0].last_seen(), at(49));
    }

    #[test]
    fn window_slides_with_each_repeat() {
        let steady = collect(Duration::from_millis(300), (0..10).map(|i| warn("tick", i * 200)));
        assert_eq!(steady.len(), 1);

        let with_gap = collect(
            Duration::from_millis(300),
            (0..10).map(|i| warn("tick", i * 200)).chain([warn("tick", 1_800 + 301)]),
        );
        assert_eq!(with_gap.len(), 2);
        assert_eq!(with_gap[1].repeat_count, 1);
    }

    #[test]
    fn different_locations_do_not_merge() {
        let signals = collect(
            Duration::from_secs(1),
            [
                RawSignal::page_error("Uncaught Error: x")
                    .with_location(Location::new("a.js").at(1, 1))
                    .at(at(0)),
                RawSignal::page_error("Uncaught Error: x")
                    .with_location(Location::new("b.js").at(1, 1))
                    .at(at(0)),
            ],
        );
        assert_eq!(signals.len(), 2);
    }

    #[test]
    fn late_arrival_keeps_earliest_timestamp() {
        let signals = collect(Duration::from_secs(1), [warn("late", 500), warn("late", 100)]);

        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].repeat_count, 2);
        assert_eq!(signals[0].signal.timestamp, at(100));
        assert_eq!(signals[0].last_seen(), at(500));
    }

    #[test]
    fn zero_window_keeps_everything() {
        let signals = collect(Duration::ZERO, [warn("same", 0), warn("same", 0)]);
        assert_eq!(signals.len(), 2);
    }

    #[test]
    fn hands_over_in_timestamp_order() {
        let order: Vec<_> = collect(
            Duration::from_secs(1),
            [warn("c", 30), warn("a", 10), warn("b", 20)],
        )
        .into_iter()
        .map(|s| s.signal.message)
        .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    proptest! {
        #[test]
        fn repeat_counts_account_for_every_signal(
            events in prop::collection::vec((0usize..4, 0i64..5_000), 0..200),
            window_ms in 0u64..2_000,
        ) {
            let messages = ["a", "b", "c", "d"];
            let signals = collect(
                Duration::from_millis(window_ms),
                events.iter().map(|(m, ms)| warn(messages[*m], *ms)),
            );

            let total: u32 = signals.iter().map(|s| s.repeat_count).sum();
            prop_assert_eq!(total as usize, events.len());
            prop_assert!(signals.windows(2).all(|w| w[0].signal.timestamp <= w[1].signal.timestamp));
        }

        #[test]
        fn merging_ignores_arrival_order(
            events in prop::collection::vec((0usize..3, 0i64..5_000), 0..100),
        ) {
            let messages = ["a", "b", "c"];
            let forward: Vec<_> = events.iter().map(|(m, ms)| warn(messages[*m], *ms)).collect();
            let mut backward = forward.clone();
            backward.reverse();

            let counts = |signals: Vec<CollectedSignal>| {
                let mut counts: Vec<_> = signals
                    .into_iter()
                    .map(|s| (s.signal.message, s.signal.timestamp, s.repeat_count))
                    .collect();
                counts.sort();
                counts
            };
            prop_assert_eq!(
                counts(collect(Duration::from_secs(1), forward)),
                counts(collect(Duration::from_secs(1), backward))
            );
        }
    }
}
