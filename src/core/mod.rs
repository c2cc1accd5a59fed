//! Core types for the GPIB relay driver
//!
//! This module contains the error type and configuration shared by every layer.

pub mod error;
pub mod types;
pub mod serde;

pub use self::error::{Error, Result};
pub use self::types::{
    BusAddress,
    ChunkBoundary,
    IoErrorPolicy,
    SessionConfig,
};

/// Highest primary address on the bus
pub const MAX_BUS_ADDRESS: u8 = 30;

/// Serial device used when none is configured
pub const DEFAULT_DEVICE: &str = "/dev/ttyACM0";

/// Baud rate the relay firmware runs at
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default cap on a STATUS reply line
pub const DEFAULT_STATUS_LINE_CAP: usize = 256;
