//! Transport module - the byte stream underneath the relay protocol
//!
//! Provides:
//! - The [`Link`] abstraction over a duplex byte stream
//! - [`ByteTransport`] for exact-length reads and writes
//! - [`SerialLink`] for the relay's serial device

mod link;
mod serial;

#[cfg(test)]
pub(crate) mod mock;

pub use link::{ByteTransport, Link};
pub use serial::{SerialLink, INDEFINITE};
