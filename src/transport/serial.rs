//! Serial device access for the relay.

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::debug;

use super::link::Link;
use crate::core::{Error, Result, SessionConfig};

/// Stand-in for "no timeout"; the serial backend needs a finite value
pub const INDEFINITE: Duration = Duration::from_millis(i32::MAX as u64);

/// The relay's serial port
pub struct SerialLink {
    /// Open serial port
    port: Box<dyn SerialPort>,
    /// Device path the port was opened from
    device: String,
}

impl SerialLink {
    /// Opens the device named in the configuration for reading and writing
    pub fn open(config: &SessionConfig) -> Result<Self> {
        let port = serialport::new(config.device.as_str(), config.baud_rate)
            .timeout(config.timeout.unwrap_or(INDEFINITE))
            .open()
            .map_err(|e| Error::open(config.device.as_str(), e))?;

        debug!(device = %config.device, baud = config.baud_rate, "serial port opened");

        Ok(SerialLink {
            port,
            device: config.device.clone(),
        })
    }

    /// Device path
    pub fn device(&self) -> &str {
        &self.device
    }
}

impl Read for SerialLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl Link for SerialLink {
    fn set_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.port
            .set_timeout(timeout.unwrap_or(INDEFINITE))
            .map_err(io::Error::from)
    }

    fn timeout(&self) -> Option<Duration> {
        let timeout = self.port.timeout();
        if timeout >= INDEFINITE {
            None
        } else {
            Some(timeout)
        }
    }
}
