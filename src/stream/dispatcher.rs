//! Binds replay sessions to the stream path
//!
//! Every request on the stream path gets the CORS headers. `OPTIONS`
//! preflights are answered immediately; any other method opens an event
//! stream backed by its own [`ReplaySession`] task.

use crate::domain::{EventSequence, PacingPolicy, StreamPath};
use crate::infrastructure::{log_messages, StatusSink};
use crate::stream::headers;
use crate::stream::session::{ChannelSink, ReplaySession};
use crate::stream::shutdown::ShutdownSignal;
use crate::stream::types::{ClientAddr, StreamError};
use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{Method, StatusCode, Version},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use bytes::Bytes;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Frames buffered between a session and its response body. One keeps a
/// session at most one frame ahead of the transport.
pub const FRAME_BUFFER: usize = 1;

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct Dispatcher {
    events: EventSequence,
    pacing: PacingPolicy,
    status: StatusSink,
    shutdown: ShutdownSignal,
}

impl Dispatcher {
    pub fn new(
        events: EventSequence,
        pacing: PacingPolicy,
        status: StatusSink,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            events,
            pacing,
            status,
            shutdown,
        }
    }

    /// Router serving the event stream at `stream_path` and nothing else
    pub fn into_router(self, stream_path: &StreamPath) -> Router {
        Router::new()
            .route(stream_path.as_ref(), any(stream_handler))
            .with_state(Arc::new(self))
            .layer(TraceLayer::new_for_http())
    }

    fn open_stream(&self, client: ClientAddr, version: Version) -> Response {
        let (tx, mut rx) = mpsc::channel::<Bytes>(FRAME_BUFFER);
        let session = ReplaySession::new(
            client,
            self.events.clone(),
            self.pacing,
            self.status.clone(),
            self.shutdown.clone(),
            ChannelSink::new(tx),
        );
        tokio::spawn(session.run());

        let frames = futures_util::stream::poll_fn(move |cx| {
            rx.poll_recv(cx).map(|frame| frame.map(Ok::<_, Infallible>))
        });
        let mut response = Body::from_stream(frames).into_response();
        headers::apply_cors(response.headers_mut());
        headers::apply_event_stream(response.headers_mut(), version);
        response
    }
}

/// HTTP/0.9 has no response head, so there is nowhere to put the event-stream
/// headers. HTTP/1.0 streams with a close-delimited body.
fn supports_incremental_delivery(version: Version) -> bool {
    version != Version::HTTP_09
}

async fn stream_handler(State(dispatcher): State<Arc<Dispatcher>>, request: Request) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::OK.into_response();
        headers::apply_cors(response.headers_mut());
        return response;
    }

    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| ClientAddr::from(*addr))
        .unwrap_or_else(ClientAddr::unknown);

    let version = request.version();
    if !supports_incremental_delivery(version) {
        let err = StreamError::StreamingUnsupported { version };
        warn!(%client, error = %err, "Refusing stream");
        dispatcher
            .status
            .emit(log_messages::session::streaming_unsupported(&client, &err));
        return err.into_response();
    }

    dispatcher.open_stream(client, version)
}
