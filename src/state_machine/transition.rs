//! Pure state transition function
//!
//! Submit handling, response folding and the retry policy for the single
//! outstanding model request.

use super::{DispatchState, Effect, Event};
use crate::llm::LlmErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Attempts per submitted message, including the first
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Backoff after the first failed attempt; doubles each time
pub const BASE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Shown when the model answered without any text
pub const EMPTY_REPLY_PLACEHOLDER: &str = "PROTOCOL_ERROR: Null response from Nexus Core.";

/// Shown when the backend stayed overloaded for every attempt
pub const OVERLOAD_MESSAGE: &str =
    "NEXUS OVERLOAD: Core is under heavy load. Please try again shortly.";

/// Shown for every other failure
pub const CONNECTION_FAILURE_MESSAGE: &str =
    "CRITICAL FAILURE: Neural connection disrupted. Please re-initiate uplink.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DispatchState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DispatchState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is rejected
///
/// `EmptyMessage` and `Busy` are silent no-ops from the operator's point of
/// view; the runtime only logs them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Nexus is busy, message dropped")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &DispatchState,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (*state, event) {
        // ============================================================
        // Submit
        // ============================================================
        (_, Event::Submit { text }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyMessage)
        }

        (DispatchState::Idle, Event::Submit { text }) => {
            Ok(TransitionResult::new(DispatchState::Requesting { attempt: 1 })
                .with_effect(Effect::OpenPanel)
                .with_effect(Effect::ClearChatInput)
                .with_effect(Effect::operator_turn(text.trim()))
                .with_effect(Effect::PublishState)
                .with_effect(Effect::RequestLlm))
        }

        (DispatchState::Requesting { .. }, Event::Submit { .. }) => Err(TransitionError::Busy),

        // ============================================================
        // Response
        // ============================================================
        (DispatchState::Requesting { .. }, Event::LlmResponse { text, sources }) => {
            let text = text
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| EMPTY_REPLY_PLACEHOLDER.to_string());

            Ok(TransitionResult::new(DispatchState::Idle)
                .with_effect(Effect::system_turn(text, sources))
                .with_effect(Effect::PublishState))
        }

        // ============================================================
        // Error Handling and Retry
        // ============================================================

        // A failure from an attempt that is no longer in flight
        (DispatchState::Requesting { attempt }, Event::LlmError { attempt: failed, .. })
            if failed != attempt =>
        {
            Err(TransitionError::InvalidTransition(format!(
                "Stale failure from attempt {failed} while on attempt {attempt}"
            )))
        }

        // Transient failure with budget left -> back off and try again
        (DispatchState::Requesting { attempt }, Event::LlmError { error_kind, .. })
            if error_kind.is_transient() && attempt < MAX_RETRY_ATTEMPTS =>
        {
            let next_attempt = attempt + 1;
            Ok(TransitionResult::new(DispatchState::Requesting {
                attempt: next_attempt,
            })
            .with_effect(Effect::ScheduleRetry {
                delay: retry_delay(attempt),
                attempt: next_attempt,
            })
            .with_effect(Effect::PublishState))
        }

        // Terminal failure or exhausted budget -> error turn, back to idle
        (DispatchState::Requesting { .. }, Event::LlmError { error_kind, .. }) => {
            Ok(TransitionResult::new(DispatchState::Idle)
                .with_effect(Effect::system_turn(failure_message(error_kind), vec![]))
                .with_effect(Effect::PublishState))
        }

        (DispatchState::Requesting { attempt }, Event::RetryTimeout { attempt: retry_attempt })
            if attempt == retry_attempt =>
        {
            Ok(TransitionResult::new(DispatchState::Requesting { attempt })
                .with_effect(Effect::RequestLlm))
        }

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}

/// Delay after the given failed attempt (1-indexed): 1s, 2s, 4s, ...
pub fn retry_delay(failed_attempt: u32) -> Duration {
    BASE_RETRY_DELAY * 2u32.pow(failed_attempt.saturating_sub(1))
}

/// Operator-facing wording for a terminal failure
pub fn failure_message(kind: LlmErrorKind) -> &'static str {
    if kind.is_transient() {
        OVERLOAD_MESSAGE
    } else {
        CONNECTION_FAILURE_MESSAGE
    }
}
