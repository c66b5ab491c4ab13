//! Fixed inter-event pacing

use crate::domain::config_types::Interval;
use std::time::Duration;
use tokio::time::Sleep;

/// Uniform delay applied after every delivered event on a connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacingPolicy {
    interval: Interval,
}

impl PacingPolicy {
    pub fn new(interval: Interval) -> Self {
        Self { interval }
    }

    /// No delay between events
    pub fn immediate() -> Self {
        Self::new(Interval::from(Duration::ZERO))
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Timer for the gap that follows one delivery
    pub fn pause(&self) -> Sleep {
        tokio::time::sleep(self.interval.as_duration())
    }
}
