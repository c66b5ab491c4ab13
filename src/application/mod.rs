//! Server lifecycle
//!
//! Construction loads the event source; starting binds the listener and
//! mounts the dispatcher on the stream path.

pub mod app;

pub use app::{Application, TransportError};
