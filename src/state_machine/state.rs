//! Dispatcher state types

use serde::{Deserialize, Serialize};

/// Dispatcher state
///
/// At most one remote request is outstanding; `Requesting` doubles as the
/// busy flag for the session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchState {
    /// Ready for operator input
    #[default]
    Idle,

    /// Remote request in flight (or waiting out a backoff), 1-indexed attempt
    Requesting { attempt: u32 },
}

impl DispatchState {
    pub fn is_busy(self) -> bool {
        matches!(self, DispatchState::Requesting { .. })
    }

    pub fn attempt(self) -> Option<u32> {
        match self {
            DispatchState::Idle => None,
            DispatchState::Requesting { attempt } => Some(attempt),
        }
    }
}
