//! Error types for the session layer.
//!
//! None of these escape [`validate`](crate::validate): every failure ends up
//! as a terminal state in the report. They exist so the controller can tell
//! its own bugs (an illegal transition) apart from browser failures.

use crate::state::SessionState;
use pagecheck_browser::BrowserError;
use thiserror::Error;

/// Errors raised while driving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The state machine was asked for a transition its guards forbid.
    #[error("illegal session transition: {from} -> {to}")]
    IllegalTransition {
        /// State the session was in
        from: SessionState,
        /// State that was requested
        to: SessionState,
    },

    /// A driver call failed.
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// The session task panicked.
    #[error("session panicked: {0}")]
    Panicked(String),
}

/// A specialized Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
