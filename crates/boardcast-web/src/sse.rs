//! Server-Sent Events for live updates

use axum::response::sse::{Event, KeepAlive, Sse};
use boardcast_core::{EventBus, ProxyEvent};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Create an SSE stream from the event bus.
/// Takes EventBus by value (cheap clone, the sender is shared internally).
///
/// Lagging or disconnected receivers are simply dropped from the stream;
/// delivery is best-effort with no replay.
pub fn create_sse_stream(
    event_bus: EventBus,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = event_bus.subscribe();
    let stream = BroadcastStream::new(rx);

    let sse_stream = stream.filter_map(|result: Result<ProxyEvent, _>| {
        result.ok().map(|event: ProxyEvent| {
            Ok(Event::default()
                .event(event.channel())
                .data(event.payload().to_string()))
        })
    });

    Sse::new(sse_stream).keep_alive(KeepAlive::default())
}
