//! GPIB Relay: host-side driver for a serial GPIB/HPIB relay
//!
//! A microcontroller on a serial link relays commands onto an instrument bus.
//! This library speaks its protocol: single control bytes carrying a 6-bit
//! command and 2-bit flags, length-prefixed chunks of at most 255 bytes for
//! data, and line-terminated text for short replies.
//!
//! # Examples
//!
//! ```no_run
//! use gpib_relay::{BusAddress, Session, SessionConfig};
//!
//! fn main() -> gpib_relay::Result<()> {
//!     let mut session = Session::open(SessionConfig::new("/dev/ttyACM0"))?;
//!     if !session.ping()? {
//!         eprintln!("relay is not answering");
//!     }
//!     session.remote(true)?;
//!     session.assign_listener(BusAddress::new(1)?)?;
//!     session.write(b"F5")?;
//!     session.close()
//! }
//! ```

pub mod core;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod util;

// Re-export commonly used items
pub use crate::core::{BusAddress, ChunkBoundary, Error, IoErrorPolicy, Result, SessionConfig};
pub use crate::protocol::BusStatus;
pub use crate::session::Session;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
