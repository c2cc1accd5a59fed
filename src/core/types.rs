use std::fmt;
use std::time::Duration;

use serde::{Serialize, Deserialize};

use super::error::{Error, Result};

/// A primary address on the instrument bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct BusAddress(u8);

impl BusAddress {
    /// Creates a bus address, rejecting anything above the last valid address
    pub fn new(address: u8) -> Result<Self> {
        if address > super::MAX_BUS_ADDRESS {
            return Err(Error::config(format!(
                "bus address {} out of range 0..={}",
                address,
                super::MAX_BUS_ADDRESS
            )));
        }
        Ok(BusAddress(address))
    }

    /// Returns the raw address byte sent on the wire
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for BusAddress {
    type Error = Error;

    fn try_from(address: u8) -> Result<Self> {
        BusAddress::new(address)
    }
}

impl From<BusAddress> for u8 {
    fn from(address: BusAddress) -> u8 {
        address.0
    }
}

impl fmt::Display for BusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What to do when the underlying stream reports an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IoErrorPolicy {
    /// Return the error to the caller
    #[default]
    Propagate,
    /// Log the error and abort the process
    Abort,
}

/// How a write whose length is a multiple of the chunk size is terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChunkBoundary {
    /// Follow full chunks with a zero-length final chunk
    #[default]
    TrailingEmpty,
    /// Emit only the full chunks; no chunk carries the final flag
    Unterminated,
}

/// Configuration for a relay session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Serial device the relay is attached to
    pub device: String,
    /// Serial baud rate
    pub baud_rate: u32,
    /// Our own address on the bus
    pub address: BusAddress,
    /// Whether we act as controller-in-charge
    pub controller: bool,
    /// Read timeout; `None` blocks until the relay answers
    #[serde(serialize_with = "super::serde::serialize_opt_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_opt_duration")]
    pub timeout: Option<Duration>,
    /// How long a ping waits for its reply
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub ping_timeout: Duration,
    /// Longest status line accepted
    pub status_line_cap: usize,
    /// Stream error handling
    pub io_error_policy: IoErrorPolicy,
    /// Termination of writes on a chunk boundary
    pub chunk_boundary: ChunkBoundary,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            device: super::DEFAULT_DEVICE.to_string(),
            baud_rate: super::DEFAULT_BAUD_RATE,
            address: BusAddress::default(),
            controller: true,
            timeout: None,
            ping_timeout: Duration::from_secs(1),
            status_line_cap: super::DEFAULT_STATUS_LINE_CAP,
            io_error_policy: IoErrorPolicy::default(),
            chunk_boundary: ChunkBoundary::default(),
        }
    }
}

impl SessionConfig {
    /// Creates a configuration for the given device with defaults elsewhere
    pub fn new(device: impl Into<String>) -> Self {
        SessionConfig {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Checks the values that cannot be expressed through the types alone
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(Error::config("baud rate must be non-zero"));
        }
        if self.status_line_cap == 0 {
            return Err(Error::config("status line cap must be non-zero"));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(Error::config("timeout must be non-zero"));
        }
        if self.ping_timeout.is_zero() {
            return Err(Error::config("ping timeout must be non-zero"));
        }
        Ok(())
    }
}
