//! Infrastructure layer for the replay server
//!
//! The status channel that carries human-readable lines out of the core,
//! the console printer that drains it, and the message texts themselves.

pub mod log_messages;
pub mod status;

pub use status::{run_printer, status_channel, StatusMessage, StatusReceiver, StatusSink};
