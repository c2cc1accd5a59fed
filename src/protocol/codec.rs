use std::fmt;

use crate::core::{Error, Result};

/// Mask selecting the command bits of a control byte
pub const COMMAND_MASK: u8 = 0x3f;

/// Mask selecting the flag bits once shifted down
pub const FLAGS_MASK: u8 = 0x03;

/// Position of the flag field in a control byte
pub const FLAGS_SHIFT: u32 = 6;

/// Boolean argument, or final chunk of a transfer
pub const FLAG_BOOLEAN: u8 = 0x01;

/// Commands sent from the host to the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HostCommand {
    Ping = 0x00,
    Status = 0x01,
    Init = 0x02,
    LockRead = 0x03,
    Controller = 0x04,
    Remote = 0x05,
    Talker = 0x06,
    Listener = 0x07,
    Unlisten = 0x08,
    Untalk = 0x09,
    Lockout = 0x0a,
    Clear = 0x0b,
    Unlock = 0x0c,
    Trigger = 0x0d,
    Read = 0x0e,
    Write = 0x0f,
    Cmd = 0x10,
    EngageReq = 0x11,
}

impl TryFrom<u8> for HostCommand {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        use HostCommand::*;
        Ok(match code {
            0x00 => Ping,
            0x01 => Status,
            0x02 => Init,
            0x03 => LockRead,
            0x04 => Controller,
            0x05 => Remote,
            0x06 => Talker,
            0x07 => Listener,
            0x08 => Unlisten,
            0x09 => Untalk,
            0x0a => Lockout,
            0x0b => Clear,
            0x0c => Unlock,
            0x0d => Trigger,
            0x0e => Read,
            0x0f => Write,
            0x10 => Cmd,
            0x11 => EngageReq,
            other => {
                return Err(Error::protocol(format!("unknown host command 0x{:02x}", other)))
            }
        })
    }
}

/// Commands sent from the relay to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DeviceCommand {
    Pong = 0x00,
    Chunk = 0x01,
    String = 0x02,
    Request = 0x03,
}

impl TryFrom<u8> for DeviceCommand {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0x00 => Ok(DeviceCommand::Pong),
            0x01 => Ok(DeviceCommand::Chunk),
            0x02 => Ok(DeviceCommand::String),
            0x03 => Ok(DeviceCommand::Request),
            other => Err(Error::protocol(format!(
                "unknown relay command 0x{:02x}",
                other
            ))),
        }
    }
}

/// A single control byte: 6-bit command, 2-bit flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlByte {
    command: u8,
    flags: u8,
}

impl ControlByte {
    /// Creates a control byte, truncating both fields to their widths
    pub fn new(command: u8, flags: u8) -> Self {
        ControlByte {
            command: command & COMMAND_MASK,
            flags: flags & FLAGS_MASK,
        }
    }

    /// Control byte for a host command
    pub fn host(command: HostCommand, flags: u8) -> Self {
        ControlByte::new(command as u8, flags)
    }

    /// Control byte for a host command with a boolean argument
    pub fn host_bool(command: HostCommand, state: bool) -> Self {
        ControlByte::host(command, if state { FLAG_BOOLEAN } else { 0 })
    }

    /// Packs into the wire byte
    pub fn encode(&self) -> u8 {
        self.command | (self.flags << FLAGS_SHIFT)
    }

    /// Unpacks a wire byte; every byte value is valid
    pub fn decode(byte: u8) -> Self {
        ControlByte {
            command: byte & COMMAND_MASK,
            flags: (byte >> FLAGS_SHIFT) & FLAGS_MASK,
        }
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Whether the BOOLEAN flag bit is set
    pub fn is_boolean(&self) -> bool {
        self.flags & FLAG_BOOLEAN != 0
    }

    /// Classifies the command as sent by the relay
    pub fn device_command(&self) -> Result<DeviceCommand> {
        DeviceCommand::try_from(self.command)
    }
}

impl fmt::Display for ControlByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}/{}", self.command, self.flags)
    }
}

/// Packs a command and flags into a control byte
pub fn encode(command: u8, flags: u8) -> u8 {
    ControlByte::new(command, flags).encode()
}

/// Splits a control byte into command and flags
pub fn decode(byte: u8) -> (u8, u8) {
    let control = ControlByte::decode(byte);
    (control.command(), control.flags())
}
