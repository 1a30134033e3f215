//! Property-based tests for the dispatcher state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::*;
use super::*;
use crate::conversation::Speaker;
use crate::llm::LlmErrorKind;
use proptest::prelude::*;
use std::time::Duration;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_error_kind() -> impl Strategy<Value = LlmErrorKind> {
    prop_oneof![
        Just(LlmErrorKind::Network),
        Just(LlmErrorKind::RateLimit),
        Just(LlmErrorKind::ServerError),
        Just(LlmErrorKind::Auth),
        Just(LlmErrorKind::InvalidRequest),
        Just(LlmErrorKind::Unknown),
    ]
}

fn arb_state() -> impl Strategy<Value = DispatchState> {
    prop_oneof![
        Just(DispatchState::Idle),
        (1u32..=MAX_RETRY_ATTEMPTS).prop_map(|attempt| DispatchState::Requesting { attempt }),
    ]
}

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n]{0,8}"
}

/// Outcome of a remote attempt: `Ok(())` is a success, `Err(kind)` a failure
fn arb_attempt_outcome() -> impl Strategy<Value = Result<(), LlmErrorKind>> {
    prop_oneof![
        1 => Just(Ok(())),
        3 => arb_error_kind().prop_map(Err),
    ]
}

// ============================================================================
// Simulation
// ============================================================================

#[derive(Debug, Default)]
struct Simulation {
    requests: u32,
    delays: Vec<Duration>,
    turns: Vec<(Speaker, String)>,
}

/// Drive one submit through the state machine, answering each `RequestLlm`
/// from `script` (successes once the script runs out).
fn simulate(script: &[Result<(), LlmErrorKind>]) -> (DispatchState, Simulation) {
    let mut sim = Simulation::default();
    let mut state = DispatchState::Idle;
    let mut pending = vec![Event::submit("status report")];

    while let Some(event) = pending.pop() {
        let result = transition(&state, event).expect("scripted events are always valid");
        state = result.new_state;

        for effect in result.effects {
            match effect {
                Effect::AppendTurn { speaker, text, .. } => sim.turns.push((speaker, text)),
                Effect::RequestLlm => {
                    let outcome = script
                        .get(sim.requests as usize)
                        .copied()
                        .unwrap_or(Ok(()));
                    sim.requests += 1;
                    pending.push(match outcome {
                        Ok(()) => Event::LlmResponse {
                            text: Some("ok".to_string()),
                            sources: vec![],
                        },
                        Err(kind) => Event::LlmError {
                            error_kind: kind,
                            attempt: state.attempt().unwrap_or(0),
                        },
                    });
                }
                Effect::ScheduleRetry { delay, attempt } => {
                    sim.delays.push(delay);
                    pending.push(Event::RetryTimeout { attempt });
                }
                Effect::OpenPanel | Effect::ClearChatInput | Effect::PublishState => {}
            }
        }
    }

    (state, sim)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_blank_submit_is_always_rejected(state in arb_state(), text in arb_blank()) {
        prop_assert_eq!(
            transition(&state, Event::submit(text)).unwrap_err(),
            TransitionError::EmptyMessage
        );
    }

    #[test]
    fn prop_busy_drops_submits(attempt in 1u32..=MAX_RETRY_ATTEMPTS, text in "[a-z]{1,20}") {
        let state = DispatchState::Requesting { attempt };
        prop_assert_eq!(
            transition(&state, Event::submit(text)).unwrap_err(),
            TransitionError::Busy
        );
    }

    #[test]
    fn prop_every_submit_ends_idle_with_one_reply(
        script in proptest::collection::vec(arb_attempt_outcome(), 0..6)
    ) {
        let (state, sim) = simulate(&script);

        prop_assert_eq!(state, DispatchState::Idle);
        prop_assert!(sim.requests >= 1 && sim.requests <= MAX_RETRY_ATTEMPTS);
        prop_assert_eq!(sim.turns.len(), 2);
        prop_assert_eq!(sim.turns[0].0, Speaker::Operator);
        prop_assert_eq!(sim.turns[1].0, Speaker::System);
    }

    #[test]
    fn prop_only_transient_failures_are_retried(
        script in proptest::collection::vec(arb_attempt_outcome(), 0..6)
    ) {
        let (_, sim) = simulate(&script);

        // Every attempt before the last one must have failed transiently
        for outcome in script.iter().take(sim.requests as usize - 1) {
            prop_assert!(matches!(outcome, Err(kind) if kind.is_transient()));
        }

        let expected: Vec<_> = (1..sim.requests).map(retry_delay).collect();
        prop_assert_eq!(sim.delays, expected);
    }

    #[test]
    fn prop_failure_wording_matches_last_error(
        script in proptest::collection::vec(arb_attempt_outcome(), 0..6)
    ) {
        let (_, sim) = simulate(&script);
        let last = script.get(sim.requests as usize - 1).copied().unwrap_or(Ok(()));
        let reply = sim.turns[1].1.as_str();

        match last {
            Ok(()) => prop_assert_eq!(reply, "ok"),
            Err(kind) if kind.is_transient() => prop_assert_eq!(reply, OVERLOAD_MESSAGE),
            Err(_) => prop_assert_eq!(reply, CONNECTION_FAILURE_MESSAGE),
        }
    }

    #[test]
    fn prop_attempt_never_exceeds_budget(
        state in arb_state(),
        kind in arb_error_kind(),
    ) {
        let attempt = state.attempt().unwrap_or(1);
        let event = Event::LlmError {
            error_kind: kind,
            attempt,
        };
        if let Ok(result) = transition(&state, event) {
            if let DispatchState::Requesting { attempt } = result.new_state {
                prop_assert!(attempt <= MAX_RETRY_ATTEMPTS);
            }
        }
    }
}

#[test]
fn test_two_overloads_then_success() {
    let script = [
        Err(LlmErrorKind::ServerError),
        Err(LlmErrorKind::ServerError),
        Ok(()),
    ];
    let (state, sim) = simulate(&script);

    assert_eq!(state, DispatchState::Idle);
    assert_eq!(sim.requests, 3);
    assert_eq!(
        sim.delays,
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );
    assert_eq!(sim.turns[1], (Speaker::System, "ok".to_string()));
}
