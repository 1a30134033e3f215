//! Conversation turns and the capped transcript that holds them

use crate::llm::{GroundingSource, LlmMessage};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Greeting shown before the operator has typed anything
pub const SEED_GREETING: &str =
    "NEXUS ONLINE. Uplink stable. Secure channel established for AYFJ Group operations.";

/// Default cap on the number of turns a session keeps
pub const DEFAULT_MAX_TURNS: usize = 200;

/// Smallest usable cap: the seed plus one exchange
pub const MIN_MAX_TURNS: usize = 3;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Operator,
    System,
}

/// One message unit in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub text: String,
    #[serde(default)]
    pub sources: Vec<GroundingSource>,
    pub created_at: DateTime<Local>,
}

impl ConversationTurn {
    pub fn operator(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Operator,
            text: text.into(),
            sources: vec![],
            created_at: Local::now(),
        }
    }

    pub fn system(text: impl Into<String>, sources: Vec<GroundingSource>) -> Self {
        Self {
            speaker: Speaker::System,
            text: text.into(),
            sources,
            created_at: Local::now(),
        }
    }

    /// Wall-clock label shown next to the turn
    pub fn time_label(&self) -> String {
        self.created_at.format("%H:%M:%S").to_string()
    }

    fn to_llm_message(&self) -> LlmMessage {
        match self.speaker {
            Speaker::Operator => LlmMessage::user(self.text.clone()),
            Speaker::System => LlmMessage::model(self.text.clone()),
        }
    }
}

/// Append-only list of turns, always starting with the seeded greeting.
///
/// When full, the oldest turn after the seed is evicted.
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
    max_turns: usize,
}

impl Transcript {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: vec![ConversationTurn::system(SEED_GREETING, vec![])],
            max_turns: max_turns.max(MIN_MAX_TURNS),
        }
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
        if self.turns.len() > self.max_turns {
            let evicted = self.turns.remove(1);
            tracing::debug!(
                speaker = ?evicted.speaker,
                max_turns = self.max_turns,
                "Evicted oldest turn from transcript"
            );
        }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    #[allow(dead_code)] // Used by tests
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Request history: every turn except the seed, oldest first
    pub fn history(&self) -> Vec<LlmMessage> {
        self.turns
            .iter()
            .skip(1)
            .map(ConversationTurn::to_llm_message)
            .collect()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}
