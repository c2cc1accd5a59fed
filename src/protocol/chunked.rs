//! Chunked transfers between the host and the relay.
//!
//! A transfer larger than one frame travels as a sequence of chunks, each a
//! control byte, a one-byte length, and up to [`MAX_CHUNK_LEN`] payload bytes.
//! The BOOLEAN flag on a chunk's control byte marks it as the last one.
//!
//! ```text
//! host -> relay   WRITE[|BOOLEAN]  len  payload...
//! host -> relay   READ
//! relay -> host   CHUNK[|BOOLEAN]  len  payload...
//!            or   STRING  text... \n
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, warn};

use super::codec::{ControlByte, DeviceCommand, HostCommand, FLAG_BOOLEAN};
use crate::core::{ChunkBoundary, Error, Result};
use crate::transport::{ByteTransport, Link};

/// Largest payload a single chunk can carry
pub const MAX_CHUNK_LEN: usize = 255;

/// Sends one control byte
pub fn write_command<L: Link>(transport: &mut ByteTransport<L>, control: ControlByte) -> Result<()> {
    transport.write_exact(&[control.encode()])
}

/// Receives one control byte
pub fn read_command<L: Link>(transport: &mut ByteTransport<L>) -> Result<ControlByte> {
    transport.read_byte().map(ControlByte::decode)
}

/// Reads a line of text, dropping CR and LF, up to `max_size` bytes
///
/// Stops after the first LF. A line longer than `max_size` fails with
/// [`Error::Overflow`] and leaves the rest of the line unread.
pub fn read_line<L: Link>(transport: &mut ByteTransport<L>, max_size: usize) -> Result<Bytes> {
    let mut line = BytesMut::new();
    loop {
        match transport.read_byte().map_err(mid_frame)? {
            b'\n' => break,
            b'\r' => continue,
            byte => {
                if line.len() >= max_size {
                    warn!(limit = max_size, "relay line exceeds limit");
                    return Err(Error::Overflow { limit: max_size });
                }
                line.put_u8(byte);
            }
        }
    }
    Ok(line.freeze())
}

/// Splits and reassembles chunked transfers
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkedTransfer {
    boundary: ChunkBoundary,
}

impl ChunkedTransfer {
    /// Creates a transfer helper with the given boundary handling
    pub fn new(boundary: ChunkBoundary) -> Self {
        ChunkedTransfer { boundary }
    }

    /// Boundary handling in effect for sends
    pub fn boundary(&self) -> ChunkBoundary {
        self.boundary
    }

    /// Lengths of the chunks `len` bytes are sent as, in order
    pub fn plan(&self, len: usize) -> Vec<usize> {
        let mut sizes: Vec<usize> = (0..len)
            .step_by(MAX_CHUNK_LEN)
            .map(|offset| MAX_CHUNK_LEN.min(len - offset))
            .collect();
        if self.boundary == ChunkBoundary::TrailingEmpty && len % MAX_CHUNK_LEN == 0 {
            sizes.push(0);
        }
        sizes
    }

    /// Sends `data` to the relay, returning the number of chunks written
    ///
    /// Full chunks go out without the BOOLEAN flag; a shorter chunk carries it
    /// and ends the transfer. When `data` is a whole number of full chunks,
    /// [`ChunkBoundary`] decides whether an empty final chunk follows.
    pub fn send<L: Link>(&self, transport: &mut ByteTransport<L>, data: &[u8]) -> Result<usize> {
        let mut offset = 0;
        let plan = self.plan(data.len());
        for &size in &plan {
            send_chunk(transport, &data[offset..offset + size])?;
            offset += size;
        }
        debug!(bytes = data.len(), chunks = plan.len(), "transfer sent");
        Ok(plan.len())
    }

    /// Requests data from the relay, accepting at most `max_size` bytes
    pub fn receive<L: Link>(&self, transport: &mut ByteTransport<L>, max_size: usize) -> Result<Bytes> {
        write_command(transport, ControlByte::host(HostCommand::Read, 0))?;
        let response = read_command(transport)?;
        match response.device_command() {
            Ok(DeviceCommand::String) => read_line(transport, max_size),
            Ok(DeviceCommand::Chunk) => read_chunks(transport, response, max_size),
            _ => {
                warn!(%response, "relay answered READ without data");
                Err(Error::protocol(format!(
                    "expected a data transfer but received {}",
                    response
                )))
            }
        }
    }
}

fn send_chunk<L: Link>(transport: &mut ByteTransport<L>, segment: &[u8]) -> Result<()> {
    debug_assert!(segment.len() <= MAX_CHUNK_LEN);
    let flags = if segment.len() < MAX_CHUNK_LEN { FLAG_BOOLEAN } else { 0 };

    let mut frame = BytesMut::with_capacity(2 + segment.len());
    frame.put_u8(ControlByte::host(HostCommand::Write, flags).encode());
    frame.put_u8(segment.len() as u8);
    frame.put_slice(segment);
    transport.write_exact(&frame)
}

fn read_chunks<L: Link>(
    transport: &mut ByteTransport<L>,
    mut response: ControlByte,
    max_size: usize,
) -> Result<Bytes> {
    let mut data = BytesMut::with_capacity(max_size.min(MAX_CHUNK_LEN));
    let mut payload = [0u8; MAX_CHUNK_LEN];
    let mut chunks = 0usize;

    loop {
        if response.flags() & !FLAG_BOOLEAN != 0 {
            warn!(%response, chunks, "chunk carries unknown flags");
            return Err(Error::protocol(format!(
                "chunk carries unknown flags {}",
                response
            )));
        }

        let len = transport.read_byte().map_err(mid_frame)? as usize;
        // Consume the payload before checking the limit so the stream stays aligned
        transport.read_into(&mut payload[..len]).map_err(mid_frame)?;
        if data.len() + len > max_size {
            warn!(limit = max_size, received = data.len() + len, "relay transfer exceeds limit");
            return Err(Error::Overflow { limit: max_size });
        }
        data.put_slice(&payload[..len]);
        chunks += 1;

        if response.is_boolean() {
            break;
        }

        write_command(transport, ControlByte::host(HostCommand::Read, 0))?;
        response = read_command(transport)?;
        if response.device_command().ok() != Some(DeviceCommand::Chunk) {
            warn!(%response, chunks, "chunk stream interrupted");
            return Err(Error::protocol(format!(
                "chunk stream interrupted by {}",
                response
            )));
        }
    }

    debug!(bytes = data.len(), chunks, "transfer received");
    Ok(data.freeze())
}

/// A timeout once a frame has started leaves the rest of it in the stream
fn mid_frame(err: Error) -> Error {
    match err {
        Error::Timeout { .. } => Error::Timeout { partial: true },
        other => other,
    }
}
