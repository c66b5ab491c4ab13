//! SSE Replay - a deterministic Server-Sent Events fixture server
//!
//! Loads a JSON array of events once at startup and replays it, in order and
//! at a fixed pace, to every client that connects to the stream path. After
//! the last event the connection stays open until the client leaves.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod stream;

pub use application::Application;
pub use config::ReplayConfig;
pub use error::{Error, Result};
