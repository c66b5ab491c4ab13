//! Status line texts
//!
//! This module centralizes every human-readable status line the server
//! writes to the status sink, so the console output stays consistent.

use crate::infrastructure::status::StatusMessage;
use std::fmt::Display;

/// Server lifecycle messages
pub mod server {
    use super::*;

    pub fn starting_headless(port: impl Display) -> StatusMessage {
        format!("Starting SSE server in headless mode on port {port}...").into()
    }

    pub fn listening(port: impl Display, stream_path: impl Display) -> StatusMessage {
        format!("Server listening on http://localhost:{port}{stream_path}").into()
    }

    pub fn error(err: impl Display) -> StatusMessage {
        format!("Server error: {err}").into()
    }

    pub fn shutting_down() -> StatusMessage {
        "Server shutting down".to_string().into()
    }
}

/// Per-connection replay messages
pub mod session {
    use super::*;

    pub fn client_connected(client: impl Display) -> StatusMessage {
        format!("Client connected: {client}").into()
    }

    /// `index` is the 0-based cursor; the line counts events from 1.
    pub fn event_sent(index: usize, client: impl Display) -> StatusMessage {
        format!("Sent event {} to {client}", index + 1).into()
    }

    pub fn encode_failed(err: impl Display) -> StatusMessage {
        err.to_string().into()
    }

    pub fn client_disconnected(client: impl Display) -> StatusMessage {
        format!("Client disconnected: {client}").into()
    }

    pub fn client_disconnected_after_completion(client: impl Display) -> StatusMessage {
        format!("Client disconnected after completion: {client}").into()
    }

    pub fn streaming_unsupported(client: impl Display, err: impl Display) -> StatusMessage {
        format!("Rejected stream for {client}: {err}").into()
    }
}
