//! Streaming replay engine
//!
//! - [`session`]: the per-connection replay state machine
//! - [`dispatcher`]: routes the stream path to a fresh session per request
//! - [`frame`]: `data: <json>\n\n` encoding

pub mod dispatcher;
pub mod error_response;
pub mod frame;
pub mod headers;
pub mod session;
pub mod shutdown;
pub mod types;

pub use dispatcher::Dispatcher;
pub use session::{
    ChannelSink, CloseReason, FrameSink, ReplaySession, SessionReport, SessionState,
};
pub use shutdown::{ShutdownHandle, ShutdownSignal};
pub use types::{ClientAddr, SessionId, SinkClosed, StreamError, StreamResult};
