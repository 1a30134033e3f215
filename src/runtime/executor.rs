//! Session runtime executor

use super::traits::LlmClient;
use super::SseEvent;

use crate::llm::LlmRequest;
use crate::router::{CommandRouter, RouteOutcome, SectionNavigator, HIGHLIGHT_DURATION};
use crate::session::{Session, SessionSnapshot, TurnView};
use crate::state_machine::{transition, Effect, Event, TransitionError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};

/// Generic session runtime that can work with any LLM and page implementation
///
/// Owns the session exclusively; everything else talks to it through the
/// event channel. Background work (model calls, backoff, highlight expiry)
/// reports back on a weak sender, so the runtime stops once every handle
/// is dropped.
pub struct SessionRuntime<L, N>
where
    L: LlmClient + 'static,
    N: SectionNavigator,
{
    session: Session,
    persona: Arc<str>,
    router: Arc<CommandRouter>,
    llm_client: Arc<L>,
    navigator: N,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::WeakSender<Event>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl<L, N> SessionRuntime<L, N>
where
    L: LlmClient + 'static,
    N: SectionNavigator,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: Session,
        persona: Arc<str>,
        router: Arc<CommandRouter>,
        llm_client: L,
        navigator: N,
        event_rx: mpsc::Receiver<Event>,
        event_tx: &mpsc::Sender<Event>,
        broadcast_tx: broadcast::Sender<SseEvent>,
        snapshot_tx: watch::Sender<SessionSnapshot>,
    ) -> Self {
        Self {
            session,
            persona,
            router,
            llm_client: Arc::new(llm_client),
            navigator,
            event_rx,
            event_tx: event_tx.downgrade(),
            broadcast_tx,
            snapshot_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.session.id, "Starting session runtime");

        while let Some(event) = self.event_rx.recv().await {
            self.process_event(event);
            self.snapshot_tx.send_replace(self.session.snapshot());
        }

        tracing::info!(session_id = %self.session.id, "Session runtime stopped");
    }

    fn process_event(&mut self, event: Event) {
        // Route may turn into a Submit, so work off a small queue
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            if !current_event.is_dispatch() {
                if let Some(generated) = self.apply_ui_event(current_event) {
                    events_to_process.push(generated);
                }
                continue;
            }

            let result = match transition(&self.session.dispatch, current_event) {
                Ok(r) => r,
                Err(e @ (TransitionError::EmptyMessage | TransitionError::Busy)) => {
                    tracing::debug!(session_id = %self.session.id, reason = %e, "Submit ignored");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(session_id = %self.session.id, error = %e, "Event rejected");
                    continue;
                }
            };

            self.session.dispatch = result.new_state;
            for effect in result.effects {
                self.execute_effect(effect);
            }
        }
    }

    /// Apply a page-level event; may yield a follow-up dispatch event
    fn apply_ui_event(&mut self, event: Event) -> Option<Event> {
        match event {
            Event::Route { query } => {
                match self.router.route(&query, &self.navigator) {
                    RouteOutcome::Ignored => None,
                    RouteOutcome::Navigated { section_id } => {
                        tracing::info!(session_id = %self.session.id, section = %section_id, "Navigated to section");
                        self.session.search_input.clear();
                        self.session.highlighted_section = Some(section_id.clone());
                        self.session.highlight_generation += 1;
                        let generation = self.session.highlight_generation;
                        self.schedule(
                            HIGHLIGHT_DURATION,
                            Event::HighlightExpired {
                                section_id,
                                generation,
                            },
                        );
                        None
                    }
                    RouteOutcome::Forwarded { text } => {
                        tracing::info!(session_id = %self.session.id, "Query forwarded to chat");
                        self.session.search_input.clear();
                        Some(Event::Submit { text })
                    }
                }
            }

            Event::SetPanel { open } => {
                self.set_panel(open);
                None
            }

            Event::SetDraft { chat, search } => {
                if let Some(chat) = chat {
                    self.session.chat_input = chat;
                }
                if let Some(search) = search {
                    self.session.search_input = search;
                }
                None
            }

            Event::HighlightExpired {
                section_id,
                generation,
            } => {
                // A newer jump owns the highlight now, even on the same section
                if generation == self.session.highlight_generation
                    && self.session.highlighted_section.is_some()
                {
                    self.session.highlighted_section = None;
                    let _ = self
                        .broadcast_tx
                        .send(SseEvent::HighlightCleared { section_id });
                }
                None
            }

            other => {
                tracing::warn!(event = ?other, "Dispatch event reached UI handler");
                None
            }
        }
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::OpenPanel => {
                if !self.session.panel_open {
                    self.set_panel(true);
                }
            }

            Effect::ClearChatInput => {
                self.session.chat_input.clear();
            }

            effect @ Effect::AppendTurn { .. } => {
                if let Some(turn) = effect.into_turn() {
                    let view = TurnView::from(&turn);
                    self.session.transcript.push(turn);
                    let _ = self.broadcast_tx.send(SseEvent::Turn { turn: view });
                }
            }

            Effect::PublishState => {
                let _ = self.broadcast_tx.send(SseEvent::StateChange {
                    busy: self.session.is_busy(),
                    attempt: self.session.dispatch.attempt(),
                });
            }

            Effect::RequestLlm => {
                let request = LlmRequest {
                    system: self.persona.to_string(),
                    messages: self.session.transcript.history(),
                    web_search: true,
                };
                let attempt = self.session.dispatch.attempt().unwrap_or(1);
                let llm_client = self.llm_client.clone();
                let event_tx = self.event_tx.clone();
                let session_id = self.session.id.clone();

                tokio::spawn(async move {
                    tracing::info!(
                        session_id = %session_id,
                        attempt,
                        history_len = request.messages.len(),
                        "Making LLM request (background)"
                    );

                    let event = match llm_client.complete(&request).await {
                        Ok(response) => Event::LlmResponse {
                            text: response.text,
                            sources: response.sources,
                        },
                        Err(e) => {
                            tracing::warn!(
                                session_id = %session_id,
                                attempt,
                                kind = e.kind.as_str(),
                                error = %e.message,
                                "LLM request failed"
                            );
                            Event::LlmError {
                                error_kind: e.kind,
                                attempt,
                            }
                        }
                    };

                    if let Some(tx) = event_tx.upgrade() {
                        let _ = tx.send(event).await;
                    }
                });
            }

            Effect::ScheduleRetry { delay, attempt } => {
                tracing::info!(session_id = %self.session.id, attempt, delay_ms = %delay.as_millis(), "Scheduling retry");
                self.schedule(delay, Event::RetryTimeout { attempt });
            }
        }
    }

    fn set_panel(&mut self, open: bool) {
        self.session.panel_open = open;
        let _ = self.broadcast_tx.send(SseEvent::Panel { open });
    }

    /// Deliver `event` back to this runtime after `delay`
    fn schedule(&self, delay: Duration, event: Event) {
        let event_tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = event_tx.upgrade() {
                let _ = tx.send(event).await;
            }
        });
    }
}
