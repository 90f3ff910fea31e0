//! Thread-safe signal accumulation with at-most-once draining.
//!
//! Backend event handlers push signals from their own tasks while the session
//! drains them from the polling loop. We use `Arc<Mutex<Vec<_>>>` rather than a
//! channel because draining must be non-blocking and take everything queued so
//! far in one step, and ordering within a queue must be preserved.

use crate::signal::RawSignal;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared queue of signals not yet handed to the session.
///
/// Cheaply cloneable; every clone refers to the same queue.
#[derive(Debug, Clone, Default)]
pub struct SignalCapture {
    pending: Arc<Mutex<Vec<RawSignal>>>,
}

impl SignalCapture {
    /// Creates a new, empty capture queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a signal.
    ///
    /// Called by backend event handlers. A poisoned lock is recovered rather
    /// than dropping the signal, since a lost page error would change the
    /// verdict of the run.
    pub fn push(&self, signal: RawSignal) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(signal);
    }

    /// Removes and returns every queued signal in arrival order.
    ///
    /// Each signal is returned by exactly one call.
    #[must_use]
    pub fn drain(&self) -> Vec<RawSignal> {
        std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the number of signals waiting to be drained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing is waiting to be drained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalLevel;

    #[test]
    fn drain_is_at_most_once() {
        let capture = SignalCapture::new();
        capture.push(RawSignal::console(SignalLevel::Log, "first"));
        capture.push(RawSignal::console(SignalLevel::Error, "second"));

        let drained = capture.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "first");
        assert!(capture.is_empty());
        assert!(capture.drain().is_empty());

        capture.push(RawSignal::page_error("third"));
        let drained = capture.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].message, "third");
    }

    #[test]
    fn clones_share_the_queue() {
        let capture = SignalCapture::new();
        let handler_side = capture.clone();
        handler_side.push(RawSignal::console(SignalLevel::Warning, "warn"));
        assert_eq!(capture.len(), 1);
    }
}
