//! Per-connection replay state machine
//!
//! ```text
//! Connected ─▶ Sending(0) ─▶ Sending(1) ─▶ … ─▶ Draining ─▶ Closed
//!                  │              │                 ▲
//!                  └──────────────┴── cancelled ────┴──▶ Closed
//! ```
//!
//! A session pushes each event once, in source order, pausing for the pacing
//! interval after every delivery. Once the sequence is exhausted the
//! connection is held open until the client leaves or the server shuts down.
//! Cancellation is observed at every transition and during every wait.

use crate::domain::{EventSequence, PacingPolicy};
use crate::infrastructure::{log_messages, StatusSink};
use crate::stream::frame::encode_frame;
use crate::stream::shutdown::ShutdownSignal;
use crate::stream::types::{ClientAddr, SessionId, SinkClosed};
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Destination for encoded frames; one per connection.
#[async_trait]
pub trait FrameSink: Send + Sync {
    /// Hand one frame to the transport so the client sees it immediately.
    async fn send_frame(&mut self, frame: Bytes) -> Result<(), SinkClosed>;

    /// Resolves when the client can no longer receive frames.
    async fn closed(&self);
}

/// Frame sink backed by a bounded channel whose receiver feeds the response body
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn send_frame(&mut self, frame: Bytes) -> Result<(), SinkClosed> {
        self.tx.send(frame).await.map_err(|_| SinkClosed)
    }

    async fn closed(&self) {
        self.tx.closed().await
    }
}

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum SessionState {
    #[display("connected")]
    Connected,
    /// Next event to deliver
    #[display("sending({_0})")]
    Sending(usize),
    #[display("draining")]
    Draining,
    #[display("closed")]
    Closed,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum CloseReason {
    #[display("client disconnected")]
    ClientDisconnected,
    #[display("server shutdown")]
    ServerShutdown,
}

/// Summary of a finished session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub delivered: usize,
    pub skipped: usize,
    /// Whether every event was attempted before the session closed
    pub drained: bool,
    pub close_reason: Option<CloseReason>,
}

/// Outcome of a wait that races cancellation
enum Wake {
    Ready,
    Cancelled(CloseReason),
}

/// Replays one event sequence to one client
pub struct ReplaySession<S, E = crate::domain::Event> {
    id: SessionId,
    client: ClientAddr,
    events: EventSequence<E>,
    pacing: PacingPolicy,
    status: StatusSink,
    shutdown: ShutdownSignal,
    sink: S,
    state: SessionState,
    report: SessionReport,
}

impl<S, E> ReplaySession<S, E>
where
    S: FrameSink,
    E: Serialize + Send + Sync,
{
    pub fn new(
        client: ClientAddr,
        events: EventSequence<E>,
        pacing: PacingPolicy,
        status: StatusSink,
        shutdown: ShutdownSignal,
        sink: S,
    ) -> Self {
        Self {
            id: SessionId::generate(),
            client,
            events,
            pacing,
            status,
            shutdown,
            sink,
            state: SessionState::Connected,
            report: SessionReport::default(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session until it reaches `Closed`
    #[instrument(name = "replay_session", skip(self), fields(session_id = %self.id, client = %self.client))]
    pub async fn run(mut self) -> SessionReport {
        loop {
            self.state = match self.state {
                SessionState::Connected => self.connect(),
                SessionState::Sending(index) => self.send(index).await,
                SessionState::Draining => self.drain().await,
                SessionState::Closed => break,
            };
        }
        self.report
    }

    fn connect(&mut self) -> SessionState {
        info!(events = self.events.len(), "Client connected");
        self.status
            .emit(log_messages::session::client_connected(&self.client));
        SessionState::Sending(0)
    }

    async fn send(&mut self, index: usize) -> SessionState {
        if let Some(reason) = self.cancelled_now() {
            return self.close(reason);
        }
        let Some(event) = self.events.get(index) else {
            self.report.drained = true;
            debug!(delivered = self.report.delivered, "All events sent; holding connection open");
            return SessionState::Draining;
        };

        let frame = match encode_frame(index, event) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(index, error = %err, "Skipping event that failed to encode");
                self.status.emit(log_messages::session::encode_failed(&err));
                self.report.skipped += 1;
                return SessionState::Sending(index + 1);
            }
        };

        let sent = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            sent = self.sink.send_frame(frame) => Some(sent),
        };
        match sent {
            None => return self.close(CloseReason::ServerShutdown),
            Some(Err(SinkClosed)) => return self.close(CloseReason::ClientDisconnected),
            Some(Ok(())) => {}
        }

        self.report.delivered += 1;
        debug!(index, "Event sent");
        self.status
            .emit(log_messages::session::event_sent(index, &self.client));

        let pause = self.pacing.pause();
        match self.race_cancellation(pause).await {
            Wake::Ready => SessionState::Sending(index + 1),
            Wake::Cancelled(reason) => self.close(reason),
        }
    }

    async fn drain(&mut self) -> SessionState {
        match self.race_cancellation(std::future::pending::<()>()).await {
            Wake::Cancelled(reason) => self.close(reason),
            Wake::Ready => SessionState::Draining,
        }
    }

    async fn race_cancellation<F>(&mut self, wait: F) -> Wake
    where
        F: std::future::Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Wake::Cancelled(CloseReason::ServerShutdown),
            _ = self.sink.closed() => Wake::Cancelled(CloseReason::ClientDisconnected),
            _ = wait => Wake::Ready,
        }
    }

    fn cancelled_now(&self) -> Option<CloseReason> {
        self.shutdown
            .is_cancelled()
            .then_some(CloseReason::ServerShutdown)
    }

    fn close(&mut self, reason: CloseReason) -> SessionState {
        let message = if self.state == SessionState::Draining {
            log_messages::session::client_disconnected_after_completion(&self.client)
        } else {
            log_messages::session::client_disconnected(&self.client)
        };
        info!(%reason, delivered = self.report.delivered, "Client disconnected");
        self.status.emit(message);
        self.report.close_reason = Some(reason);
        SessionState::Closed
    }
}
