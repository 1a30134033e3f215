//! Effects produced by state transitions

use crate::conversation::{ConversationTurn, Speaker};
use crate::llm::GroundingSource;
use std::time::Duration;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open the chat panel if it is closed
    OpenPanel,

    /// Empty the chat input buffer
    ClearChatInput,

    /// Append a turn to the transcript (timestamped by the runtime)
    AppendTurn {
        speaker: Speaker,
        text: String,
        sources: Vec<GroundingSource>,
    },

    /// Send the transcript history to the model
    RequestLlm,

    /// Schedule a retry
    ScheduleRetry { delay: Duration, attempt: u32 },

    /// Publish the new session state to clients
    PublishState,
}

impl Effect {
    pub fn operator_turn(text: impl Into<String>) -> Self {
        Effect::AppendTurn {
            speaker: Speaker::Operator,
            text: text.into(),
            sources: vec![],
        }
    }

    pub fn system_turn(text: impl Into<String>, sources: Vec<GroundingSource>) -> Self {
        Effect::AppendTurn {
            speaker: Speaker::System,
            text: text.into(),
            sources,
        }
    }

    /// Materialize an `AppendTurn` effect into a timestamped turn
    pub fn into_turn(self) -> Option<ConversationTurn> {
        match self {
            Effect::AppendTurn {
                speaker: Speaker::Operator,
                text,
                ..
            } => Some(ConversationTurn::operator(text)),
            Effect::AppendTurn {
                speaker: Speaker::System,
                text,
                sources,
            } => Some(ConversationTurn::system(text, sources)),
            _ => None,
        }
    }
}
