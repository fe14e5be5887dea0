use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::{Stream, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/stream", get(event_stream))
}

/// Every engine event as SSE; the event name is the bus topic
async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.engine.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|received| async move {
        match received {
            Ok(event) => match event.payload() {
                Ok(payload) => Some(Ok(Event::default().event(event.name()).data(payload.to_string()))),
                Err(e) => {
                    tracing::error!(event = event.name(), "Failed to serialize event: {}", e);
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "SSE client lagged behind the event bus");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
