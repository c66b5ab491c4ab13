//! Domain types for the replay server
//!
//! Configuration values, the recorded events, the store that loads them and
//! the pacing applied while they are replayed.

pub mod config_types;
pub mod event;
pub mod event_store;
pub mod pacing;

pub use config_types::*;
pub use event::{Event, EventSequence};
pub use event_store::{EventStore, LoadError};
pub use pacing::PacingPolicy;
