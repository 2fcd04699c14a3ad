//! Configuration for the tag relay.

use crate::dedup::DEFAULT_DEDUP_THRESHOLD_SECS;
use crate::error::{RelayError, RelayResult};
use crate::scanner::DutyCycle;
use relay_link::LinkConfig;
use std::time::Duration;

/// Host the lap listener runs on unless told otherwise.
pub const DEFAULT_HOST: &str = "relay.local";

/// The listener's port and path are fixed; only the host varies.
pub const LISTENER_PORT: u16 = 8080;
pub const LISTENER_PATH: &str = "/laps";

pub const DEFAULT_READER_URI: &str = "tmr:///dev/ttyUSB0";
pub const DEFAULT_REGION: &str = "NA2";

/// Antenna power in hundredths of a dBm.
pub const READ_POWER_CDBM: u32 = 2600;
/// Writing needs the tag close to the antenna, so power is kept low.
pub const WRITE_POWER_CDBM: u32 = 500;

/// Relay pipeline configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Host name of the lap listener.
    pub host: String,

    /// Minimum seconds between two forwarded reads of one tag.
    pub dedup_threshold_secs: f64,

    /// Upper bound on a single connect attempt.
    pub connect_timeout: Duration,

    /// Optional cap on ids held while the listener is unreachable.
    pub max_pending: Option<usize>,

    /// Reader duty cycle, passed through to the driver.
    pub duty_cycle: DutyCycle,
}

impl RelayConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// WebSocket URL of the lap listener.
    pub fn url(&self) -> String {
        format!("ws://{}:{}{}", self.host, LISTENER_PORT, LISTENER_PATH)
    }

    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            connect_timeout: self.connect_timeout,
            max_pending: self.max_pending,
        }
    }

    pub fn validate(&self) -> RelayResult<()> {
        if self.host.trim().is_empty() {
            return Err(RelayError::Config("host must not be empty".to_string()));
        }
        if !self.dedup_threshold_secs.is_finite() || self.dedup_threshold_secs < 0.0 {
            return Err(RelayError::Config(format!(
                "dedup threshold must be a non-negative number of seconds, got {}",
                self.dedup_threshold_secs
            )));
        }
        if self.connect_timeout.is_zero() {
            return Err(RelayError::Config(
                "connect timeout must be greater than zero".to_string(),
            ));
        }
        if self.max_pending == Some(0) {
            return Err(RelayError::Config(
                "max pending must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            dedup_threshold_secs: DEFAULT_DEDUP_THRESHOLD_SECS,
            connect_timeout: Duration::from_secs(3),
            max_pending: None,
            duty_cycle: DutyCycle::default(),
        }
    }
}

/// Settings handed to the reader driver at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderSettings {
    pub uri: String,
    pub region: String,
    pub antennas: Vec<u8>,
    pub protocol: String,
    pub read_power_cdbm: u32,
}

impl ReaderSettings {
    /// Full power, for reading tags as they pass.
    pub fn for_reading(uri: impl Into<String>, region: impl Into<String>) -> Self {
        Self::with_power(uri, region, READ_POWER_CDBM)
    }

    /// Low power, so only the tag on the antenna gets written.
    pub fn for_writing(uri: impl Into<String>, region: impl Into<String>) -> Self {
        Self::with_power(uri, region, WRITE_POWER_CDBM)
    }

    fn with_power(uri: impl Into<String>, region: impl Into<String>, power: u32) -> Self {
        Self {
            uri: uri.into(),
            region: region.into(),
            antennas: vec![1],
            protocol: "GEN2".to_string(),
            read_power_cdbm: power,
        }
    }
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self::for_reading(DEFAULT_READER_URI, DEFAULT_REGION)
    }
}
