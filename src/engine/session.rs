//! Run lifecycle state machine.
//!
//! ```text
//! Running --complete--> Done
//! Running --interrupt--> Paused
//! Paused  --save_partial--> Done
//! Paused  --discard--> Terminated
//! Paused  --interrupt--> Terminated
//! ```
//!
//! Done and Terminated are final. Any other pairing is rejected.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RunError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Running,
    Paused,
    Done,
    Terminated,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Running => "running",
            SessionState::Paused => "paused",
            SessionState::Done => "done",
            SessionState::Terminated => "terminated",
        }
    }

    pub fn is_final(self) -> bool {
        matches!(self, SessionState::Done | SessionState::Terminated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Complete,
    Interrupt,
    SavePartial,
    Discard,
}

impl SessionEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionEvent::Complete => "complete",
            SessionEvent::Interrupt => "interrupt",
            SessionEvent::SavePartial => "save_partial",
            SessionEvent::Discard => "discard",
        }
    }
}

/// Tracks the run state and the number of interrupts delivered.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    interrupts: u8,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: SessionState::Running,
            interrupts: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn interrupts(&self) -> u8 {
        self.interrupts
    }

    /// Apply an event, returning the new state.
    pub fn apply(&mut self, event: SessionEvent) -> Result<SessionState, RunError> {
        use SessionEvent::*;
        use SessionState::*;

        let next = match (self.state, event) {
            (Running, Complete) => Done,
            (Running, Interrupt) => Paused,
            (Paused, SavePartial) => Done,
            (Paused, Discard) => Terminated,
            (Paused, Interrupt) => Terminated,
            (from, event) => {
                return Err(RunError::InvalidTransition {
                    from: from.as_str(),
                    event: event.as_str(),
                })
            }
        };

        if event == Interrupt {
            self.interrupts += 1;
        }
        debug!(
            from = self.state.as_str(),
            event = event.as_str(),
            to = next.as_str(),
            "Session transition"
        );
        self.state = next;
        Ok(next)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
