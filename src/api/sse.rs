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
        Err(_) => None, // Lagged; the next init or snapshot fetch catches up
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// The `event:` line names the kind; `data:` carries only the payload
fn sse_event_to_axum(event: SseEvent) -> Event {
    let built = match event {
        SseEvent::Init { state } => Event::default().event("init").json_data(state),
        SseEvent::Message { message } => Event::default().event("message").json_data(message),
        SseEvent::StateChange { state } => Event::default().event("state_change").json_data(state),
        SseEvent::Error { message } => Event::default()
            .event("error")
            .json_data(json!({ "message": message })),
    };

    built.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to encode SSE payload");
        Event::default()
            .event("error")
            .data(r#"{"message":"Update could not be encoded"}"#)
    })
}
