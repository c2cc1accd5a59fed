//! In-memory links for exercising the protocol without hardware.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};
use std::time::Duration;

use super::link::Link;
use crate::protocol::codec::{ControlByte, DeviceCommand, HostCommand, FLAG_BOOLEAN};

/// Serves canned input and captures everything written
pub(crate) struct ScriptedLink {
    input: VecDeque<u8>,
    output: Vec<u8>,
    fragment: usize,
    interrupts: usize,
    failure: Option<ErrorKind>,
    reads: usize,
    writes: usize,
    timeout: Option<Duration>,
    timeout_limit: Option<usize>,
}

impl ScriptedLink {
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        ScriptedLink {
            input: input.into().into(),
            output: Vec::new(),
            fragment: usize::MAX,
            interrupts: 0,
            failure: None,
            reads: 0,
            writes: 0,
            timeout: None,
            timeout_limit: None,
        }
    }

    /// Caps every read and write at `n` bytes
    pub fn with_fragment(mut self, n: usize) -> Self {
        self.fragment = n;
        self
    }

    /// Fails the first `n` reads with `Interrupted`
    pub fn with_interrupts(mut self, n: usize) -> Self {
        self.interrupts = n;
        self
    }

    /// Fails reads once input runs out, and every write, with `kind`
    pub fn with_failure(mut self, kind: ErrorKind) -> Self {
        self.failure = Some(kind);
        self
    }

    /// Lets only the first `n` timeout changes succeed
    pub fn with_timeout_limit(mut self, n: usize) -> Self {
        self.timeout_limit = Some(n);
        self
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Read for ScriptedLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.interrupts > 0 {
            self.interrupts -= 1;
            return Err(ErrorKind::Interrupted.into());
        }
        if self.input.is_empty() {
            if let Some(kind) = self.failure {
                return Err(kind.into());
            }
        }
        let n = buf.len().min(self.fragment).min(self.input.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.input.pop_front().unwrap_or_default();
        }
        if n > 0 {
            self.reads += 1;
        }
        Ok(n)
    }
}

impl Write for ScriptedLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(kind) = self.failure {
            return Err(kind.into());
        }
        let n = buf.len().min(self.fragment);
        self.output.extend_from_slice(&buf[..n]);
        if n > 0 {
            self.writes += 1;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Link for ScriptedLink {
    fn set_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        match self.timeout_limit {
            Some(0) => return Err(ErrorKind::Unsupported.into()),
            Some(ref mut n) => *n -= 1,
            None => {}
        }
        self.timeout = timeout;
        Ok(())
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[derive(Debug)]
enum PeerState {
    Command,
    Address,
    Length { last: bool },
    Payload { last: bool, remaining: usize, data: Vec<u8> },
}

/// One chunk as the relay received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReceivedChunk {
    pub last: bool,
    pub data: Vec<u8>,
}

/// Simulated relay that answers READ with the chunks it was sent via WRITE
pub(crate) struct LoopbackPeer {
    state: PeerState,
    received: Vec<ReceivedChunk>,
    pending: VecDeque<ReceivedChunk>,
    replies: VecDeque<u8>,
    fragment: usize,
}

impl LoopbackPeer {
    pub fn new() -> Self {
        LoopbackPeer {
            state: PeerState::Command,
            received: Vec::new(),
            pending: VecDeque::new(),
            replies: VecDeque::new(),
            fragment: usize::MAX,
        }
    }

    /// Caps every read at `n` bytes
    pub fn with_fragment(mut self, n: usize) -> Self {
        self.fragment = n;
        self
    }

    /// Every chunk received so far, in order
    pub fn received(&self) -> &[ReceivedChunk] {
        &self.received
    }

    fn on_byte(&mut self, byte: u8) {
        self.state = match std::mem::replace(&mut self.state, PeerState::Command) {
            PeerState::Command => self.on_command(ControlByte::decode(byte)),
            PeerState::Address => PeerState::Command,
            PeerState::Length { last } => {
                if byte == 0 {
                    self.store(last, Vec::new());
                    PeerState::Command
                } else {
                    PeerState::Payload { last, remaining: byte as usize, data: Vec::new() }
                }
            }
            PeerState::Payload { last, remaining, mut data } => {
                data.push(byte);
                if remaining == 1 {
                    self.store(last, data);
                    PeerState::Command
                } else {
                    PeerState::Payload { last, remaining: remaining - 1, data }
                }
            }
        };
    }

    fn on_command(&mut self, control: ControlByte) -> PeerState {
        match HostCommand::try_from(control.command()) {
            Ok(HostCommand::Write) => PeerState::Length { last: control.is_boolean() },
            Ok(HostCommand::Init | HostCommand::Talker | HostCommand::Listener) => {
                PeerState::Address
            }
            Ok(HostCommand::Ping) => {
                self.replies.push_back(ControlByte::new(DeviceCommand::Pong as u8, 0).encode());
                PeerState::Command
            }
            Ok(HostCommand::Read) => {
                if let Some(chunk) = self.pending.pop_front() {
                    let flags = if chunk.last { FLAG_BOOLEAN } else { 0 };
                    self.replies
                        .push_back(ControlByte::new(DeviceCommand::Chunk as u8, flags).encode());
                    self.replies.push_back(chunk.data.len() as u8);
                    self.replies.extend(chunk.data);
                }
                PeerState::Command
            }
            _ => PeerState::Command,
        }
    }

    fn store(&mut self, last: bool, data: Vec<u8>) {
        let chunk = ReceivedChunk { last, data };
        self.received.push(chunk.clone());
        self.pending.push_back(chunk);
    }
}

impl Read for LoopbackPeer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.fragment).min(self.replies.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.replies.pop_front().unwrap_or_default();
        }
        Ok(n)
    }
}

impl Write for LoopbackPeer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.on_byte(byte);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Link for LoopbackPeer {}
