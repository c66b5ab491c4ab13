//! Type definitions for the stream module

use nutype::nutype;
use std::net::SocketAddr;
use thiserror::Error;
use uuid::Uuid;

/// Identifier attached to one replay session for log correlation
#[nutype(derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, AsRef))]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new SessionId with a v7 UUID
    pub fn generate() -> Self {
        Self::new(Uuid::now_v7())
    }
}

/// Remote address of a connected client, as shown in status lines
#[derive(Clone, Debug, PartialEq, Eq, Hash, derive_more::Display)]
pub struct ClientAddr(String);

impl ClientAddr {
    /// Used when the transport does not expose the peer address
    pub fn unknown() -> Self {
        Self("unknown".to_string())
    }
}

impl From<SocketAddr> for ClientAddr {
    fn from(addr: SocketAddr) -> Self {
        Self(addr.to_string())
    }
}

/// Returned by a frame sink once the peer can no longer receive frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("client connection closed")]
pub struct SinkClosed;

/// Errors contained to a single request or a single event
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Streaming not supported over {version:?}")]
    StreamingUnsupported { version: http::Version },

    #[error("Error marshaling event {index}: {source}")]
    EventEncode {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for stream operations
pub type StreamResult<T> = Result<T, StreamError>;
