//! Close State Machine
//!
//! ```text
//! Idle ──clean──────────────────────────────┐
//!   ↓ dirty                                 ↓
//! ConfirmPending ──no──────────────────→ Closing ──→ Closed
//!   │ ↓ yes                                 ↑
//!   │ SavingBeforeClose ──saved clean───────┘
//!   │   ↓ cancelled / failed
//!   └──cancel──→ Idle
//! ```

use serde::{Deserialize, Serialize};

use crate::error::TabError;
use crate::tab::TabId;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseState {
    /// No close in progress
    Idle,
    /// Waiting for the user to answer the save prompt
    ConfirmPending,
    /// User chose to save first; waiting for the write to finish
    SavingBeforeClose,
    /// Running the closing procedure
    Closing,
    /// Tab removed from the registry
    Closed,
}

impl CloseState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: CloseState) -> bool {
        matches!(
            (self, target),
            (CloseState::Idle, CloseState::ConfirmPending)
                | (CloseState::Idle, CloseState::Closing)
                | (CloseState::ConfirmPending, CloseState::SavingBeforeClose)
                | (CloseState::ConfirmPending, CloseState::Closing)
                | (CloseState::ConfirmPending, CloseState::Idle)
                | (CloseState::SavingBeforeClose, CloseState::Closing)
                | (CloseState::SavingBeforeClose, CloseState::Idle)
                | (CloseState::Closing, CloseState::Closed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CloseState::Idle => "idle",
            CloseState::ConfirmPending => "confirm_pending",
            CloseState::SavingBeforeClose => "saving_before_close",
            CloseState::Closing => "closing",
            CloseState::Closed => "closed",
        }
    }
}

impl std::fmt::Display for CloseState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks one `close` call through the state machine.
#[derive(Debug)]
pub(crate) struct CloseFlow {
    tab_id: TabId,
    state: CloseState,
}

impl CloseFlow {
    pub(crate) fn new(tab_id: TabId) -> Self {
        Self {
            tab_id,
            state: CloseState::Idle,
        }
    }

    pub(crate) fn advance(&mut self, next: CloseState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(TabError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::debug!(
            tab_id = %self.tab_id,
            from = %self.state,
            to = %next,
            "Close state transition"
        );

        self.state = next;
        Ok(())
    }

    pub(crate) fn tab_id(&self) -> TabId {
        self.tab_id
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> CloseState {
        self.state
    }
}

/// Buttons of the "save before closing?" dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAnswer {
    /// Save, then close
    Yes,
    /// Close without saving
    No,
    Cancel,
}

impl CloseAnswer {
    pub const ALL: [CloseAnswer; 3] = [CloseAnswer::Yes, CloseAnswer::No, CloseAnswer::Cancel];

    pub fn as_str(&self) -> &'static str {
        match self {
            CloseAnswer::Yes => "yes",
            CloseAnswer::No => "no",
            CloseAnswer::Cancel => "cancel",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CloseAnswer::Yes => "Yes",
            CloseAnswer::No => "No",
            CloseAnswer::Cancel => "Cancel",
        }
    }
}

impl std::str::FromStr for CloseAnswer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yes" => Ok(CloseAnswer::Yes),
            "no" => Ok(CloseAnswer::No),
            "cancel" => Ok(CloseAnswer::Cancel),
            _ => Err(format!("Unknown close answer: {}", s)),
        }
    }
}
