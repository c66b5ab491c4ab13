//! Type-safe configuration types
//!
//! This module provides domain-specific types for configuration values,
//! ensuring validation at boundaries and preventing primitive obsession.

use nutype::nutype;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Host address the listener binds to
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 255),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct Host(String);

impl Default for Host {
    fn default() -> Self {
        Self::try_new("0.0.0.0".to_string()).expect("Default host is valid")
    }
}

/// Port number for the listening socket
#[nutype(
    validate(predicate = |port| (1..=65535).contains(port)),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct Port(u16);

impl Default for Port {
    fn default() -> Self {
        Self::try_new(8080).expect("Default port is valid")
    }
}

/// URL path the event stream is served on. Always starts with `/` and is
/// matched literally, so capture syntax (`{id}`, `:id`, `*rest`) is rejected.
#[nutype(
    sanitize(trim),
    validate(not_empty, predicate = |path| is_literal_route(path)),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct StreamPath(String);

fn is_literal_route(path: &str) -> bool {
    path.starts_with('/')
        && !path.contains(['{', '}'])
        && !path
            .split('/')
            .any(|segment| segment.starts_with([':', '*']))
}

impl Default for StreamPath {
    fn default() -> Self {
        Self::try_new("/sse".to_string()).expect("Default stream path is valid")
    }
}

/// Location of the JSON file holding the recorded events
#[nutype(
    validate(not_empty),
    derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, AsRef, Display)
)]
pub struct SourcePath(String);

impl SourcePath {
    pub fn as_path(&self) -> &Path {
        let path: &str = self.as_ref();
        Path::new(path)
    }
}

/// Capacity of the status message queue
#[nutype(
    validate(predicate = |capacity| *capacity > 0),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct StatusCapacity(usize);

impl Default for StatusCapacity {
    fn default() -> Self {
        Self::try_new(1024).expect("Default status capacity is valid")
    }
}

/// Delay between two consecutive events on one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::From, derive_more::Into)]
pub struct Interval(Duration);

impl Interval {
    pub const DEFAULT_MILLIS: u64 = 100;

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self(Duration::from_millis(Self::DEFAULT_MILLIS))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Errors produced while parsing an interval such as `50ms` or `1m30s`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntervalParseError {
    #[error("interval must not be empty")]
    Empty,

    #[error("invalid interval: {0}")]
    Invalid(String),

    #[error("missing unit in interval: {0}")]
    MissingUnit(String),

    #[error("unknown unit '{unit}' in interval: {input}")]
    UnknownUnit { unit: String, input: String },
}

impl FromStr for Interval {
    type Err = IntervalParseError;

    /// Accepts Go-style durations (`100ms`, `1.5s`, `1m30s`). A bare integer
    /// is read as milliseconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(IntervalParseError::Empty);
        }
        if let Ok(millis) = input.parse::<u64>() {
            return Ok(Self(Duration::from_millis(millis)));
        }

        let mut total = Duration::ZERO;
        let mut rest = input;
        while !rest.is_empty() {
            let number_len = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(rest.len());
            if number_len == 0 {
                return Err(IntervalParseError::Invalid(input.to_string()));
            }
            let (number, tail) = rest.split_at(number_len);
            let unit_len = tail
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(tail.len());
            let (unit, tail) = tail.split_at(unit_len);

            let value: f64 = number
                .parse()
                .map_err(|_| IntervalParseError::Invalid(input.to_string()))?;
            let nanos_per_unit = match unit {
                "ns" => 1.0,
                "us" | "µs" => 1e3,
                "ms" => 1e6,
                "s" => 1e9,
                "m" => 60e9,
                "h" => 3_600e9,
                "" => return Err(IntervalParseError::MissingUnit(input.to_string())),
                other => {
                    return Err(IntervalParseError::UnknownUnit {
                        unit: other.to_string(),
                        input: input.to_string(),
                    })
                }
            };
            let nanos = (value * nanos_per_unit).round();
            if !nanos.is_finite() || nanos >= u64::MAX as f64 {
                return Err(IntervalParseError::Invalid(input.to_string()));
            }
            total = total
                .checked_add(Duration::from_nanos(nanos as u64))
                .ok_or_else(|| IntervalParseError::Invalid(input.to_string()))?;
            rest = tail;
        }

        Ok(Self(total))
    }
}

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {s}")),
        }
    }
}
