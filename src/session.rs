//! Explicit per-visitor session state

use crate::conversation::{ConversationTurn, Transcript};
use crate::state_machine::DispatchState;
use serde::Serialize;

/// Everything the page needs to render, owned by one session runtime
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub dispatch: DispatchState,
    pub transcript: Transcript,
    pub panel_open: bool,
    pub chat_input: String,
    pub search_input: String,
    pub highlighted_section: Option<String>,
    /// Bumped on every jump; only the latest jump's timer may clear
    pub highlight_generation: u64,
}

impl Session {
    pub fn new(id: impl Into<String>, max_turns: usize) -> Self {
        Self {
            id: id.into(),
            dispatch: DispatchState::Idle,
            transcript: Transcript::new(max_turns),
            panel_open: false,
            chat_input: String::new(),
            search_input: String::new(),
            highlighted_section: None,
            highlight_generation: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.dispatch.is_busy()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            busy: self.is_busy(),
            attempt: self.dispatch.attempt(),
            panel_open: self.panel_open,
            chat_input: self.chat_input.clone(),
            search_input: self.search_input.clone(),
            highlighted_section: self.highlighted_section.clone(),
            turns: self.transcript.turns().iter().map(TurnView::from).collect(),
        }
    }
}

/// Serializable view of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub busy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    pub panel_open: bool,
    pub chat_input: String,
    pub search_input: String,
    pub highlighted_section: Option<String>,
    pub turns: Vec<TurnView>,
}

/// A turn as the page renders it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnView {
    #[serde(flatten)]
    pub turn: ConversationTurn,
    pub time: String,
}

impl From<&ConversationTurn> for TurnView {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            time: turn.time_label(),
            turn: turn.clone(),
        }
    }
}
