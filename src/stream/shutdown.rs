//! Server-wide shutdown signalling
//!
//! One [`ShutdownHandle`] fans out to any number of [`ShutdownSignal`]s: the
//! accept loop and every live session each hold a signal.

use std::sync::Arc;
use tokio::sync::watch;

/// Triggers shutdown. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

/// Observes shutdown
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    /// Resolves once shutdown was requested or every handle has been dropped
    pub async fn cancelled(&mut self) {
        // An error means the handle is gone, which is treated as shutdown.
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }
}
