//! One-way status channel from the replay core to its console or display
//!
//! Producers never wait: the queue is bounded and, once full, the oldest
//! unread line is overwritten. The single receiver learns how many lines it
//! missed and keeps reading.

use crate::domain::config_types::StatusCapacity;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// A single human-readable status line
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::From)]
pub struct StatusMessage(String);

impl StatusMessage {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StatusMessage {
    fn from(line: &str) -> Self {
        Self(line.to_string())
    }
}

/// Producer side of the status channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StatusSink {
    tx: Option<broadcast::Sender<StatusMessage>>,
}

/// Consumer side of the status channel
#[derive(Debug)]
pub struct StatusReceiver {
    rx: broadcast::Receiver<StatusMessage>,
    dropped: u64,
}

/// Create a connected sink/receiver pair holding at most `capacity` unread
/// lines (rounded up to a power of two by the underlying channel)
pub fn status_channel(capacity: StatusCapacity) -> (StatusSink, StatusReceiver) {
    let (tx, rx) = broadcast::channel(capacity.into_inner());
    (
        StatusSink { tx: Some(tx) },
        StatusReceiver { rx, dropped: 0 },
    )
}

impl StatusSink {
    /// A sink with no reader; every line is discarded
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Queue a line without blocking
    pub fn emit(&self, message: impl Into<StatusMessage>) {
        let message = message.into();
        debug!(status = %message, "status");
        if let Some(tx) = &self.tx {
            // Fails only when the receiver is gone, in which case nobody is listening.
            let _ = tx.send(message);
        }
    }
}

impl StatusReceiver {
    /// Next line, or `None` once every sink has been dropped and the queue is empty
    pub async fn recv(&mut self) -> Option<StatusMessage> {
        loop {
            match self.rx.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Lagged(missed)) => self.record_lag(missed),
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next line if one is already queued
    pub fn try_recv(&mut self) -> Option<StatusMessage> {
        loop {
            match self.rx.try_recv() {
                Ok(message) => return Some(message),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => self.record_lag(missed),
                Err(_) => return None,
            }
        }
    }

    /// Number of lines overwritten before they could be read
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn record_lag(&mut self, missed: u64) {
        self.dropped += missed;
        warn!(missed, total = self.dropped, "Status queue overflowed; oldest lines dropped");
    }
}

/// Write every status line to `out`, one per line, until the channel closes.
///
/// Returns the writer so callers (and tests) can inspect what was written.
pub async fn run_printer<W>(mut receiver: StatusReceiver, mut out: W) -> std::io::Result<W>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = receiver.recv().await {
        out.write_all(message.as_str().as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
    }
    Ok(out)
}
