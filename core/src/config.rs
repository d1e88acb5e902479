//! Load test configuration types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Load test configuration
///
/// Built once from command-line flags or environment and handed to the
/// [`LoadGenerator`](crate::LoadGenerator) by value. It is never mutated
/// while a run is in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// URL paths (or absolute URLs when `hostname` is empty)
    pub urls: Vec<String>,

    /// Host (and optional port) prefixed to every path
    pub hostname: String,

    /// `http` or `https`
    pub protocol: String,

    /// Lanes per target, and ticks per second within each lane
    pub requests_per_second: i64,

    /// How long to run; zero runs until cancelled
    pub duration: Duration,

    /// Serve the Prometheus endpoint
    pub metrics_enabled: bool,

    /// Port for the Prometheus endpoint
    pub metrics_port: u16,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            hostname: "localhost:3000".to_string(),
            protocol: Protocol::Http.to_string(),
            requests_per_second: 10,
            duration: Duration::from_secs(10),
            metrics_enabled: false,
            metrics_port: 8080,
        }
    }
}

impl LoadConfig {
    /// Create a config for the given URLs with default settings
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the hostname
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Set the protocol
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Set the requests per second
    pub fn with_requests_per_second(mut self, rps: i64) -> Self {
        self.requests_per_second = rps;
        self
    }

    /// Set the run duration (zero for indefinite)
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Enable the metrics endpoint on the given port
    pub fn with_metrics(mut self, port: u16) -> Self {
        self.metrics_enabled = true;
        self.metrics_port = port;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.urls.is_empty() {
            return Err(ConfigError::NoUrls);
        }

        self.protocol.parse::<Protocol>()?;

        if self.requests_per_second <= 0 {
            return Err(ConfigError::InvalidRps(self.requests_per_second));
        }

        Ok(())
    }

    /// Whether the run is bounded by a deadline
    pub fn mode(&self) -> RunMode {
        if self.duration.is_zero() {
            RunMode::Indefinite
        } else {
            RunMode::Timed(self.duration)
        }
    }

    /// Number of lanes started for each target
    ///
    /// Only meaningful after `validate` has succeeded.
    pub fn lanes_per_target(&self) -> usize {
        usize::try_from(self.requests_per_second).unwrap_or(0)
    }

    /// Tick interval of a single lane: one second divided by the rate
    ///
    /// Only meaningful after `validate` has succeeded.
    pub fn lane_interval(&self) -> Duration {
        let rps = u32::try_from(self.requests_per_second.max(1)).unwrap_or(u32::MAX);
        // Interval::new panics on a zero period.
        (Duration::from_secs(1) / rps).max(Duration::from_nanos(1))
    }
}

/// Supported URL schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain HTTP
    Http,
    /// HTTP over TLS
    Https,
}

impl Protocol {
    /// Scheme string as used in URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            other => Err(ConfigError::InvalidProtocol(other.to_string())),
        }
    }
}

/// How a run terminates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Runs until the caller cancels
    Indefinite,
    /// Runs until the deadline, measured from orchestration start
    Timed(Duration),
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The URL list is empty
    #[error("no URLs provided")]
    NoUrls,

    /// Protocol other than `http` or `https`
    #[error("invalid protocol, must be http or https (got {0:?})")]
    InvalidProtocol(String),

    /// Non-positive requests per second
    #[error("requests per second must be greater than 0 (got {0})")]
    InvalidRps(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> LoadConfig {
        LoadConfig::new(["/test"]).with_requests_per_second(10)
    }

    #[test]
    fn test_default_config() {
        let config = LoadConfig::default();
        assert!(config.urls.is_empty());
        assert_eq!(config.hostname, "localhost:3000");
        assert_eq!(config.protocol, "http");
        assert_eq!(config.requests_per_second, 10);
        assert_eq!(config.duration, Duration::from_secs(10));
        assert!(!config.metrics_enabled);
        assert_eq!(config.metrics_port, 8080);
    }

    #[test]
    fn test_validate_valid() {
        assert!(valid().validate().is_ok());
        assert!(valid().with_protocol("https").validate().is_ok());
    }

    #[test]
    fn test_validate_no_urls() {
        let config = LoadConfig::new(Vec::<String>::new());
        assert_eq!(config.validate(), Err(ConfigError::NoUrls));
    }

    #[test]
    fn test_validate_invalid_protocol() {
        for protocol in ["ftp", "", "HTTP", "https "] {
            let config = valid().with_protocol(protocol);
            assert_eq!(
                config.validate(),
                Err(ConfigError::InvalidProtocol(protocol.to_string()))
            );
        }
    }

    #[test]
    fn test_validate_invalid_rps() {
        assert_eq!(
            valid().with_requests_per_second(0).validate(),
            Err(ConfigError::InvalidRps(0))
        );
        assert_eq!(
            valid().with_requests_per_second(-5).validate(),
            Err(ConfigError::InvalidRps(-5))
        );
    }

    #[test]
    fn test_validate_reports_urls_first() {
        let config = LoadConfig::new(Vec::<String>::new())
            .with_protocol("ftp")
            .with_requests_per_second(0);
        assert_eq!(config.validate(), Err(ConfigError::NoUrls));
    }

    #[test]
    fn test_mode() {
        assert_eq!(
            valid().with_duration(Duration::ZERO).mode(),
            RunMode::Indefinite
        );
        assert_eq!(
            valid().with_duration(Duration::from_secs(3)).mode(),
            RunMode::Timed(Duration::from_secs(3))
        );
    }

    #[test]
    fn test_lane_interval() {
        assert_eq!(
            valid().with_requests_per_second(1).lane_interval(),
            Duration::from_secs(1)
        );
        assert_eq!(
            valid().with_requests_per_second(4).lane_interval(),
            Duration::from_millis(250)
        );
        assert_eq!(valid().with_requests_per_second(4).lanes_per_target(), 4);
    }

    #[test]
    fn test_protocol_parse() {
        assert_eq!("http".parse::<Protocol>(), Ok(Protocol::Http));
        assert_eq!("https".parse::<Protocol>(), Ok(Protocol::Https));
        assert!("ws".parse::<Protocol>().is_err());
        assert_eq!(Protocol::Https.to_string(), "https");
    }

    #[test]
    fn test_config_serialization() {
        let config = valid().with_metrics(9090);
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: LoadConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, config);
    }
}
