//! Server-Sent Events support

use crate::runtime::SseEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream
pub fn sse_stream(
    init_event: SseEvent,
    broadcast_rx: tokio::sync::broadcast::Receiver<SseEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move { Ok(sse_event_to_axum(init_event)) });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(sse_event_to_axum(event))),
        // A lagging page resyncs from GET /api/sessions/:id
        Err(_) => None,
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn sse_event_to_axum(event: SseEvent) -> Event {
    let (event_type, data) = match event {
        SseEvent::Init { snapshot } => (
            "init",
            json!({
                "type": "init",
                "snapshot": snapshot
            }),
        ),
        SseEvent::Turn { turn } => (
            "turn",
            json!({
                "type": "turn",
                "turn": turn
            }),
        ),
        SseEvent::StateChange { busy, attempt } => (
            "state_change",
            json!({
                "type": "state_change",
                "busy": busy,
                "attempt": attempt
            }),
        ),
        SseEvent::Scroll {
            section_id,
            highlight_ms,
        } => (
            "scroll",
            json!({
                "type": "scroll",
                "section_id": section_id,
                "highlight_ms": highlight_ms
            }),
        ),
        SseEvent::HighlightCleared { section_id } => (
            "highlight_cleared",
            json!({
                "type": "highlight_cleared",
                "section_id": section_id
            }),
        ),
        SseEvent::Panel { open } => (
            "panel",
            json!({
                "type": "panel",
                "open": open
            }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}
