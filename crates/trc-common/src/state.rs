//! Recorder session lifecycle.
//!
//! CONFIGURED → RUNNING → STOPPED
//!
//! The frequency override is only accepted while CONFIGURED. A stopped
//! session is final; a new session needs a new timestamp clock.

use crate::error::{TraceError, TraceResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recorder session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Timer resolved and validated; frequency may still be overridden.
    #[default]
    Configured,
    /// Session started; timestamps are being taken.
    Running,
    /// Session ended.
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured => write!(f, "CONFIGURED"),
            Self::Running => write!(f, "RUNNING"),
            Self::Stopped => write!(f, "STOPPED"),
        }
    }
}

impl SessionState {
    /// Check if a transition to `target` is valid from the current state.
    #[must_use]
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::{Configured, Running, Stopped};

        matches!(
            (self, target),
            (Configured, Running)
                | (Running, Stopped)
                // Abandoning a session that never started
                | (Configured, Stopped)
        )
    }

    /// Attempt to transition to `target`, returning error if invalid.
    pub fn transition_to(&mut self, target: SessionState) -> TraceResult<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(TraceError::InvalidStateTransition {
                from: self.to_string(),
                to: target.to_string(),
            })
        }
    }

    /// Returns true while timestamps may be taken.
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true while the timer configuration may still change.
    #[must_use]
    pub fn is_configurable(&self) -> bool {
        matches!(self, Self::Configured)
    }
}
