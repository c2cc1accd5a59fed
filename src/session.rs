//! An open connection to the relay and the bus commands it accepts.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::core::{BusAddress, Error, Result, SessionConfig};
use crate::protocol::{
    read_command, read_line, write_command, BusStatus, ChunkedTransfer, ControlByte,
    DeviceCommand, HostCommand,
};
use crate::transport::{ByteTransport, Link, SerialLink};

/// A session with the relay
///
/// Opening a session initialises the relay with our bus address and, when
/// configured, makes it controller-in-charge. Closing consumes the session.
/// Every exchange blocks until the relay answers or the configured timeout
/// expires; there is never more than one exchange in flight.
pub struct Session<L: Link = SerialLink> {
    transport: ByteTransport<L>,
    transfer: ChunkedTransfer,
    config: SessionConfig,
}

impl Session<SerialLink> {
    /// Opens the configured serial device and initialises the relay
    pub fn open(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let link = SerialLink::open(&config)?;
        Session::with_link(link, config)
    }
}

impl<L: Link> Session<L> {
    /// Initialises the relay over an already open link
    pub fn with_link(link: L, config: SessionConfig) -> Result<Self> {
        config.validate()?;
        let mut session = Session {
            transport: ByteTransport::new(link, config.io_error_policy),
            transfer: ChunkedTransfer::new(config.chunk_boundary),
            config,
        };
        session.init()?;
        debug!(
            device = %session.config.device,
            address = %session.config.address,
            controller = session.config.controller,
            "relay session open"
        );
        Ok(session)
    }

    fn init(&mut self) -> Result<()> {
        let init = ControlByte::host(HostCommand::Init, 0);
        self.transport
            .write_exact(&[init.encode(), self.config.address.value()])?;
        if self.config.controller {
            self.command(HostCommand::Controller, false)?;
        }
        Ok(())
    }

    fn command(&mut self, command: HostCommand, state: bool) -> Result<()> {
        debug!(?command, state, "relay command");
        write_command(&mut self.transport, ControlByte::host_bool(command, state))
    }

    fn command_with_address(&mut self, command: HostCommand, address: BusAddress) -> Result<()> {
        debug!(?command, %address, "relay command");
        let control = ControlByte::host(command, 0);
        self.transport.write_exact(&[control.encode(), address.value()])
    }

    /// Checks that the relay is responsive
    ///
    /// Returns false if the relay answers with anything other than PONG, or
    /// does not answer within the ping timeout.
    pub fn ping(&mut self) -> Result<bool> {
        let previous = self.transport.link().timeout();
        self.transport
            .link_mut()
            .set_timeout(Some(self.config.ping_timeout))?;

        let reply = self
            .command(HostCommand::Ping, false)
            .and_then(|_| read_command(&mut self.transport));
        let restored = self.transport.link_mut().set_timeout(previous);

        let pong = match reply {
            Ok(control) => {
                let pong = control.device_command().ok() == Some(DeviceCommand::Pong);
                if !pong {
                    warn!(%control, "relay answered ping without pong");
                }
                pong
            }
            Err(Error::Timeout { partial: false }) => {
                warn!(timeout = ?self.config.ping_timeout, "relay did not answer ping");
                false
            }
            Err(e) => {
                if let Err(restore) = restored {
                    warn!(error = %restore, "failed to restore timeout after ping");
                }
                return Err(e);
            }
        };
        restored?;
        Ok(pong)
    }

    /// Asks for the bus status and discards the reply text
    pub fn query_status(&mut self) -> Result<()> {
        self.command(HostCommand::Status, false)?;
        let reply = read_command(&mut self.transport)?;
        if reply.device_command().ok() == Some(DeviceCommand::String) {
            let line = read_line(&mut self.transport, self.config.status_line_cap)?;
            debug!(len = line.len(), "status line discarded");
        }
        Ok(())
    }

    /// Asks for the bus status and parses the reply
    pub fn bus_status(&mut self) -> Result<BusStatus> {
        self.command(HostCommand::Status, false)?;
        let reply = read_command(&mut self.transport)?;
        if reply.device_command().ok() != Some(DeviceCommand::String) {
            warn!(%reply, "relay answered status without text");
            return Err(Error::protocol(format!(
                "expected a status string but received {}",
                reply
            )));
        }
        let line = read_line(&mut self.transport, self.config.status_line_cap)?;
        BusStatus::parse(&line)
    }

    /// Holds the relay from reading further data when `state` is set
    pub fn lock_read(&mut self, state: bool) -> Result<()> {
        self.command(HostCommand::LockRead, state)
    }

    /// Asserts or releases REN
    pub fn remote(&mut self, state: bool) -> Result<()> {
        self.command(HostCommand::Remote, state)
    }

    pub fn untalk(&mut self) -> Result<()> {
        self.command(HostCommand::Untalk, false)
    }

    pub fn unlisten(&mut self) -> Result<()> {
        self.command(HostCommand::Unlisten, false)
    }

    /// Locks out the front panels of instruments in remote
    pub fn lockout(&mut self) -> Result<()> {
        self.command(HostCommand::Lockout, false)
    }

    /// Clears the addressed listeners, or every device when `bus` is set
    pub fn clear(&mut self, bus: bool) -> Result<()> {
        self.command(HostCommand::Clear, bus)
    }

    /// Returns instruments to local control
    pub fn unlock(&mut self) -> Result<()> {
        self.command(HostCommand::Unlock, false)
    }

    /// Triggers the addressed listeners, or every device when `bus` is set
    pub fn trigger(&mut self, bus: bool) -> Result<()> {
        self.command(HostCommand::Trigger, bus)
    }

    /// Addresses the device at `address` to talk
    pub fn assign_talker(&mut self, address: BusAddress) -> Result<()> {
        self.command_with_address(HostCommand::Talker, address)
    }

    /// Addresses the device at `address` to listen
    pub fn assign_listener(&mut self, address: BusAddress) -> Result<()> {
        self.command_with_address(HostCommand::Listener, address)
    }

    /// Reads data from the current talker, at most `max_size` bytes
    pub fn read(&mut self, max_size: usize) -> Result<Bytes> {
        self.transfer.receive(&mut self.transport, max_size)
    }

    /// Writes data to the current listeners
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.transfer.send(&mut self.transport, data).map(|_| ())
    }

    /// Our bus address
    pub fn address(&self) -> BusAddress {
        self.config.address
    }

    /// Whether we are controller-in-charge
    pub fn is_controller(&self) -> bool {
        self.config.controller
    }

    /// Device path the session was opened on
    pub fn device(&self) -> &str {
        &self.config.device
    }

    /// Configuration the session was opened with
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The link underneath the session
    pub fn link(&self) -> &L {
        self.transport.link()
    }

    /// Flushes pending output and releases the connection
    pub fn close(mut self) -> Result<()> {
        self.transport.flush()?;
        debug!(device = %self.config.device, "relay session closed");
        Ok(())
    }
}
