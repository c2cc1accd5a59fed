//! Exact-length byte transfers over a duplex stream.
//!
//! The relay protocol has no resynchronisation, so every read and write must
//! move precisely the number of bytes asked for. Short transfers are retried
//! until complete; a stream error is handled according to [`IoErrorPolicy`].

use std::io::{self, ErrorKind, Read, Write};
use std::time::Duration;

use tracing::{error, trace, Level};

use crate::core::{Error, IoErrorPolicy, Result};
use crate::util::hex_dump;

/// A duplex byte stream the relay is reachable through
pub trait Link: Read + Write {
    /// Changes the read timeout; `None` waits indefinitely
    fn set_timeout(&mut self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }

    /// Current read timeout
    fn timeout(&self) -> Option<Duration> {
        None
    }
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn set_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        (**self).set_timeout(timeout)
    }

    fn timeout(&self) -> Option<Duration> {
        (**self).timeout()
    }
}

/// Byte-exact reader/writer over a [`Link`]
pub struct ByteTransport<L> {
    link: L,
    policy: IoErrorPolicy,
}

impl<L: Link> ByteTransport<L> {
    /// Wraps a link with the given error policy
    pub fn new(link: L, policy: IoErrorPolicy) -> Self {
        ByteTransport { link, policy }
    }

    /// Reads exactly `n` bytes
    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    /// Fills `buf` completely
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.link.read(&mut buf[filled..]) {
                Ok(0) => return Err(self.fail(Error::ConnectionClosed)),
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::TimedOut => {
                    return Err(Error::Timeout { partial: filled > 0 })
                }
                Err(e) => return Err(self.fail(e.into())),
            }
        }
        if tracing::enabled!(Level::TRACE) {
            trace!("R {}", hex_dump(buf));
        }
        Ok(())
    }

    /// Reads a single byte
    pub fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_into(&mut byte)?;
        Ok(byte[0])
    }

    /// Writes all of `bytes`
    pub fn write_exact(&mut self, bytes: &[u8]) -> Result<()> {
        if tracing::enabled!(Level::TRACE) {
            trace!("T {}", hex_dump(bytes));
        }
        let mut written = 0;
        while written < bytes.len() {
            match self.link.write(&bytes[written..]) {
                Ok(0) => {
                    let err = io::Error::new(ErrorKind::WriteZero, "relay accepted no bytes");
                    return Err(self.fail(err.into()));
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::TimedOut => {
                    return Err(Error::Timeout { partial: written > 0 })
                }
                Err(e) => return Err(self.fail(e.into())),
            }
        }
        Ok(())
    }

    /// Flushes anything the link buffers
    pub fn flush(&mut self) -> Result<()> {
        match self.link.flush() {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Error policy in effect
    pub fn policy(&self) -> IoErrorPolicy {
        self.policy
    }

    /// Reference to the underlying link
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutable reference to the underlying link
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Unwraps the transport, returning the link
    pub fn into_inner(self) -> L {
        self.link
    }

    fn fail(&self, err: Error) -> Error {
        if self.policy == IoErrorPolicy::Abort {
            error!("unrecoverable relay stream error: {}", err);
            std::process::abort();
        }
        err
    }
}
