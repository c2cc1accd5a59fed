use std::io;
use thiserror::Error;

/// Custom error types for the GPIB relay driver
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to open {device}: {reason}")]
    Open {
        /// Device path that was requested
        device: String,
        /// Why the open failed
        reason: String,
    },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Transfer exceeds the {limit} byte limit")]
    Overflow {
        /// Caller-supplied maximum
        limit: usize,
    },

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Timed out waiting for the relay")]
    Timeout {
        /// Part of a frame had already arrived when the timeout hit
        partial: bool,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Status line error: {0}")]
    Status(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new open error
    pub fn open(device: impl Into<String>, reason: impl ToString) -> Self {
        Error::Open {
            device: device.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Error::Protocol(msg.into())
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Creates a new status line error
    pub fn status(msg: impl Into<String>) -> Self {
        Error::Status(msg.into())
    }

    /// Whether the error left the command/response stream in an unknown position
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            Error::Protocol(_) | Error::Overflow { .. } | Error::Timeout { partial: true }
        )
    }
}
