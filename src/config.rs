//! Layered configuration loading
//!
//! Sources, lowest precedence first: built-in defaults, `config/default`
//! and `config/local` (any format the `config` crate understands), an
//! explicit config file, `SSE_REPLAY__*` environment variables, and finally
//! command-line overrides.

use crate::domain::config_types::{
    Host, Interval, IntervalParseError, Port, SourcePath, StatusCapacity, StreamPath,
};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, instrument};

/// Environment variable prefix (`SSE_REPLAY__PORT=9000`)
pub const ENV_PREFIX: &str = "SSE_REPLAY";

/// Errors raised while assembling the configuration
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Source(#[from] ConfigError),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("invalid interval: {0}")]
    Interval(#[from] IntervalParseError),
}

/// Immutable server configuration, fixed before the server starts
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayConfig {
    pub source_path: SourcePath,
    pub host: Host,
    pub port: Port,
    pub stream_path: StreamPath,
    pub interval: Interval,
    pub status_capacity: StatusCapacity,
}

/// Values supplied explicitly, usually from the command line
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub config_file: Option<PathBuf>,
    pub source_path: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub stream_path: Option<String>,
    pub interval: Option<String>,
    pub status_capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    source_path: Option<String>,
    host: String,
    port: i64,
    stream_path: String,
    interval: String,
    status_capacity: i64,
}

impl ReplayConfig {
    /// Configuration with every default applied
    pub fn new(source_path: SourcePath) -> Self {
        Self {
            source_path,
            host: Host::default(),
            port: Port::default(),
            stream_path: StreamPath::default(),
            interval: Interval::default(),
            status_capacity: StatusCapacity::default(),
        }
    }

    pub fn with_port(mut self, port: Port) -> Self {
        self.port = port;
        self
    }

    pub fn with_stream_path(mut self, stream_path: StreamPath) -> Self {
        self.stream_path = stream_path;
        self
    }

    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    /// Assemble the configuration from every layered source
    #[instrument]
    pub fn load(overrides: &SettingsOverrides) -> Result<Self, SettingsError> {
        let mut builder = Config::builder()
            .set_default("host", Host::default().into_inner())?
            .set_default("port", i64::from(Port::default().into_inner()))?
            .set_default("stream_path", StreamPath::default().into_inner())?
            .set_default("interval", Interval::default().to_string())?
            .set_default("status_capacity", StatusCapacity::default().into_inner() as i64)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = &overrides.config_file {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path.as_path()).required(true));
        }

        let raw: RawSettings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("source_path", overrides.source_path.clone())?
            .set_override_option("host", overrides.host.clone())?
            .set_override_option("port", overrides.port.map(i64::from))?
            .set_override_option("stream_path", overrides.stream_path.clone())?
            .set_override_option("interval", overrides.interval.clone())?
            .set_override_option("status_capacity", overrides.status_capacity.map(|c| c as i64))?
            .build()?
            .try_deserialize()?;

        raw.validate()
    }
}

impl RawSettings {
    fn validate(self) -> Result<ReplayConfig, SettingsError> {
        let source_path = self
            .source_path
            .ok_or(SettingsError::Missing("source_path"))
            .and_then(|path| {
                SourcePath::try_new(path).map_err(|e| invalid("source_path", e))
            })?;
        let host = Host::try_new(self.host).map_err(|e| invalid("host", e))?;
        let port = u16::try_from(self.port)
            .map_err(|e| invalid("port", e))
            .and_then(|port| Port::try_new(port).map_err(|e| invalid("port", e)))?;
        let stream_path =
            StreamPath::try_new(self.stream_path).map_err(|e| invalid("stream_path", e))?;
        let interval = self.interval.parse::<Interval>()?;
        let status_capacity = usize::try_from(self.status_capacity)
            .map_err(|e| invalid("status_capacity", e))
            .and_then(|capacity| {
                StatusCapacity::try_new(capacity).map_err(|e| invalid("status_capacity", e))
            })?;

        Ok(ReplayConfig {
            source_path,
            host,
            port,
            stream_path,
            interval,
            status_capacity,
        })
    }
}

fn invalid(field: &'static str, reason: impl std::fmt::Display) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use std::time::Duration;

    fn with_source() -> SettingsOverrides {
        SettingsOverrides {
            source_path: Some("events.json".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_apply() {
        let config = ReplayConfig::load(&with_source()).unwrap();

        assert_eq!(config.source_path.as_ref(), "events.json");
        assert_eq!(config.host.as_ref(), "0.0.0.0");
        assert_eq!(config.port.into_inner(), 8080);
        assert_eq!(config.stream_path.as_ref(), "/sse");
        assert_eq!(config.interval.as_duration(), Duration::from_millis(100));
        assert_eq!(config.status_capacity.into_inner(), 1024);
    }

    #[test]
    fn test_loaded_defaults_match_constructor() {
        let loaded = ReplayConfig::load(&with_source()).unwrap();
        let built = ReplayConfig::new(SourcePath::try_new("events.json".to_string()).unwrap());
        assert_eq!(loaded, built);
    }

    #[test]
    fn test_overrides_win() {
        let overrides = SettingsOverrides {
            port: Some(8888),
            stream_path: Some("/sse-e2e".to_string()),
            interval: Some("50ms".to_string()),
            ..with_source()
        };

        let config = ReplayConfig::load(&overrides).unwrap();

        assert_eq!(config.port.into_inner(), 8888);
        assert_eq!(config.stream_path.as_ref(), "/sse-e2e");
        assert_eq!(config.interval.as_duration(), Duration::from_millis(50));
    }

    #[test]
    fn test_missing_source_path() {
        let err = ReplayConfig::load(&SettingsOverrides::default()).unwrap_err();
        assert!(matches!(err, SettingsError::Missing("source_path")));
    }

    #[test]
    fn test_stream_path_must_start_with_separator() {
        let overrides = SettingsOverrides {
            stream_path: Some("sse".to_string()),
            ..with_source()
        };

        let err = ReplayConfig::load(&overrides).unwrap_err();

        assert!(matches!(err, SettingsError::Invalid { field: "stream_path", .. }));
    }

    #[rstest]
    #[case("/:events")]
    #[case("/sse/*tail")]
    #[case("/{stream}")]
    fn test_stream_path_with_route_captures_rejected(#[case] path: &str) {
        let overrides = SettingsOverrides {
            stream_path: Some(path.to_string()),
            ..with_source()
        };

        let err = ReplayConfig::load(&overrides).unwrap_err();

        assert!(matches!(err, SettingsError::Invalid { field: "stream_path", .. }));
    }

    #[test]
    fn test_port_zero_rejected() {
        let overrides = SettingsOverrides {
            port: Some(0),
            ..with_source()
        };

        let err = ReplayConfig::load(&overrides).unwrap_err();

        assert!(matches!(err, SettingsError::Invalid { field: "port", .. }));
    }

    #[test]
    fn test_bad_interval_rejected() {
        let overrides = SettingsOverrides {
            interval: Some("soon".to_string()),
            ..with_source()
        };

        let err = ReplayConfig::load(&overrides).unwrap_err();

        assert!(matches!(err, SettingsError::Interval(_)));
    }

    #[test]
    fn test_config_file_layer() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "source_path = \"fixtures/chat.json\"\nport = 9100\ninterval = \"1s\""
        )
        .unwrap();
        let overrides = SettingsOverrides {
            config_file: Some(file.path().to_path_buf()),
            port: Some(9200),
            ..Default::default()
        };

        let config = ReplayConfig::load(&overrides).unwrap();

        assert_eq!(config.source_path.as_ref(), "fixtures/chat.json");
        assert_eq!(config.port.into_inner(), 9200);
        assert_eq!(config.interval.as_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_builder_methods() {
        let config = ReplayConfig::new(SourcePath::try_new("a.json".to_string()).unwrap())
            .with_port(Port::try_new(9000).unwrap())
            .with_stream_path(StreamPath::try_new("/events".to_string()).unwrap())
            .with_interval(Interval::from(Duration::ZERO));

        assert_eq!(config.port.into_inner(), 9000);
        assert_eq!(config.stream_path.as_ref(), "/events");
        assert_eq!(config.interval.as_duration(), Duration::ZERO);
    }
}
