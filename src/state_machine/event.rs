//! Events that can occur in a session

use crate::llm::{GroundingSource, LlmErrorKind};

/// Events delivered to a session runtime
///
/// Dispatch events go through the pure transition function; UI events
/// (routing, panel, drafts, highlight expiry) are applied by the runtime.
#[derive(Debug, Clone)]
pub enum Event {
    // Dispatch events
    /// Operator submitted chat text
    Submit { text: String },
    /// Remote model answered
    LlmResponse {
        text: Option<String>,
        sources: Vec<GroundingSource>,
    },
    /// Remote model call failed on the given attempt
    LlmError {
        error_kind: LlmErrorKind,
        attempt: u32,
    },
    /// Backoff elapsed, time to try again
    RetryTimeout { attempt: u32 },

    // UI events
    /// Page search box submitted
    Route { query: String },
    /// Open or close the chat panel
    SetPanel { open: bool },
    /// Sync draft input buffers
    SetDraft {
        chat: Option<String>,
        search: Option<String>,
    },
    /// Transient section highlight ran out
    HighlightExpired { section_id: String, generation: u64 },
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::Submit { text: text.into() }
    }

    pub fn route(query: impl Into<String>) -> Self {
        Event::Route {
            query: query.into(),
        }
    }

    /// Whether the dispatcher state machine handles this event
    pub fn is_dispatch(&self) -> bool {
        matches!(
            self,
            Event::Submit { .. }
                | Event::LlmResponse { .. }
                | Event::LlmError { .. }
                | Event::RetryTimeout { .. }
        )
    }
}
