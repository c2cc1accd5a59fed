//! Protocol implementation module
//!
//! This module defines the relay's control-byte encoding, chunked transfers,
//! and the bus status reply.

pub mod chunked;
pub mod codec;
pub mod status;

pub use self::chunked::{read_command, read_line, write_command, ChunkedTransfer, MAX_CHUNK_LEN};
pub use self::codec::{ControlByte, DeviceCommand, HostCommand, FLAG_BOOLEAN};
pub use self::status::BusStatus;
