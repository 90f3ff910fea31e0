//! The session lifecycle state machine.
//!
//! ```text
//! Idle -> Launching -> Navigating -> Capturing -> Completed
//!             |            |            |
//!             +------------+------------+--> Failed | TimedOut
//! ```
//!
//! Guards live in [`SessionState::can_transition_to`]; [`SessionMachine`]
//! enforces them and keeps the path taken for diagnostics.

use crate::error::{Result, SessionError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// A named lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Request accepted, nothing started
    Idle,
    /// Starting a browser backend
    Launching,
    /// Loading the target and waiting for the ready condition
    Navigating,
    /// Page is ready; collecting until quiet or out of budget
    Capturing,
    /// Capture ended because the page went quiet
    Completed,
    /// Launch, navigation or capture failed
    Failed,
    /// The budget ran out
    TimedOut,
}

impl SessionState {
    /// Returns true for states a session never leaves.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::TimedOut
        )
    }

    /// Transition guard.
    #[must_use]
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::{Capturing, Completed, Failed, Idle, Launching, Navigating, TimedOut};

        matches!(
            (self, next),
            (Idle, Launching)
                | (Launching, Navigating | Failed | TimedOut)
                | (Navigating, Capturing | Failed | TimedOut)
                | (Capturing, Completed | Failed | TimedOut)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Idle => "idle",
            SessionState::Launching => "launching",
            SessionState::Navigating => "navigating",
            SessionState::Capturing => "capturing",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
            SessionState::TimedOut => "timed_out",
        })
    }
}

/// Guarded holder of the current state.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    state: SessionState,
    history: Vec<SessionState>,
}

impl SessionMachine {
    /// Creates a machine in [`SessionState::Idle`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            history: vec![SessionState::Idle],
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Every state visited, in order, starting with `Idle`.
    #[must_use]
    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    /// Moves to `next` if the guard allows it.
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` and leaves the state unchanged otherwise.
    pub fn transition(&mut self, next: SessionState) -> Result<SessionState> {
        if !self.state.can_transition_to(next) {
            return Err(SessionError::IllegalTransition {
                from: self.state,
                to: next,
            });
        }

        info!("session {} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
        Ok(next)
    }
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}
