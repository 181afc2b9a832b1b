//! SSE response for one package stream session.
//!
//! Each [`StreamEvent`] becomes one SSE event named after its type, with the
//! JSON payload on a single `data:` line. The response ends after `done`;
//! dropping it (client disconnect) drops the session's receiver, which stops
//! the package manager.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::Stream;
use pkgstore_core::{EventStream, StreamEvent, WireFrame};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

/// Keep-alive comment interval, short enough for common proxy timeouts.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Convert a stream event into an Axum SSE event.
///
/// Returns `None` (after logging) if the payload cannot be serialized.
pub fn to_sse_event(event: &StreamEvent) -> Option<Event> {
    match WireFrame::encode(event) {
        Ok(frame) => Some(Event::default().event(frame.name).data(frame.data)),
        Err(e) => {
            tracing::warn!(event = event.name(), "Failed to serialize event: {}", e);
            None
        }
    }
}

/// Wrap a session's events in an SSE response.
pub fn session_response(
    events: EventStream,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    let stream = ReceiverStream::new(events.into_receiver())
        .filter_map(|event| to_sse_event(&event).map(Ok));

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL).text("ping"))
}
