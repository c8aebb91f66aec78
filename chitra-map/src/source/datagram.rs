//! UDP client for a remote view server.
//!
//! # Exchange
//!
//! ```text
//! viewer                      server
//!   │ ── "Hello" ──────────────▶ │
//!   │ ◀──────────── greeting ── │
//!   │ ── "step" ───────────────▶ │
//!   │ ◀────── record | reset | quit | "" ── │
//!   │ ── "reset" ──────────────▶ │   (rewind request)
//! ```
//!
//! | Reply | Step |
//! |-------|------|
//! | `quit` | [`SourceStep::Quit`] |
//! | `reset` | [`SourceStep::Idle`] (explicit no-op record) |
//! | empty | [`SourceStep::Exhausted`] |
//! | anything else | [`SourceStep::Record`] |
//! | no reply before the read timeout | [`SourceStep::Pending`] |

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use super::{DataSource, DeviceSource, RangeDevice, SourceStep};
use crate::error::{Error, Result};

/// Maximum datagram payload accepted from the server.
const MAX_DATAGRAM_SIZE: usize = 65536;

/// How long to wait for the handshake greeting.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(3);

const HANDSHAKE: &str = "Hello";
const STEP_REQUEST: &str = "step";
const RESET_REQUEST: &str = "reset";
const QUIT_REPLY: &str = "quit";
const RESET_REPLY: &str = "reset";

/// Connection settings for [`DatagramSource`].
#[derive(Clone, Debug)]
pub struct DatagramConfig {
    /// Server host name or address
    pub host: String,
    /// Server control port
    pub control_port: u16,
    /// Step reply timeout; `None` blocks until a reply arrives
    pub read_timeout: Option<Duration>,
}

impl Default for DatagramConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            control_port: 5600,
            read_timeout: None,
        }
    }
}

/// Pulls records from a remote view server over UDP.
pub struct DatagramSource {
    socket: UdpSocket,
    server: SocketAddr,
    buffer: Vec<u8>,
    open: bool,
}

impl DatagramSource {
    /// Bind a local socket and perform the handshake.
    pub fn connect(config: &DatagramConfig) -> Result<Self> {
        let unavailable =
            |e: std::io::Error| Error::SourceUnavailable(format!("{}: {}", config.host, e));

        let server = (config.host.as_str(), config.control_port)
            .to_socket_addrs()
            .map_err(unavailable)?
            .next()
            .ok_or_else(|| {
                Error::SourceUnavailable(format!("{} did not resolve", config.host))
            })?;

        let bind_addr = if server.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" };
        let socket = UdpSocket::bind(bind_addr).map_err(unavailable)?;

        let mut source = Self {
            socket,
            server,
            buffer: vec![0u8; MAX_DATAGRAM_SIZE],
            open: true,
        };

        source
            .socket
            .set_read_timeout(Some(HANDSHAKE_TIMEOUT))
            .map_err(unavailable)?;
        source.send(HANDSHAKE).map_err(unavailable)?;
        let greeting = source.receive().map_err(unavailable)?;
        log::info!("Remote view server {} says: {}", server, greeting);

        source
            .socket
            .set_read_timeout(config.read_timeout)
            .map_err(unavailable)?;
        Ok(source)
    }

    /// Address of the remote server.
    pub fn server(&self) -> SocketAddr {
        self.server
    }

    fn send(&self, message: &str) -> std::io::Result<()> {
        self.socket.send_to(message.as_bytes(), self.server)?;
        Ok(())
    }

    fn receive(&mut self) -> std::io::Result<String> {
        let (len, _src) = self.socket.recv_from(&mut self.buffer)?;
        Ok(String::from_utf8_lossy(&self.buffer[..len]).into_owned())
    }
}

impl DeviceSource for DatagramSource {
    fn data_source(&self) -> DataSource {
        DataSource::Network
    }

    fn range_device(&self) -> RangeDevice {
        RangeDevice::Datagram
    }

    fn step(&mut self) -> Result<SourceStep> {
        if !self.open {
            return Ok(SourceStep::Exhausted);
        }

        self.send(STEP_REQUEST)?;
        let reply = match self.receive() {
            Ok(reply) => reply,
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                log::debug!("No reply from {}", self.server);
                return Ok(SourceStep::Pending);
            }
            Err(e) => return Err(e.into()),
        };

        Ok(match reply.as_str() {
            QUIT_REPLY => {
                log::info!("Remote view server {} requested shutdown", self.server);
                SourceStep::Quit
            }
            RESET_REPLY => SourceStep::Idle,
            "" => SourceStep::Exhausted,
            _ => SourceStep::Record(reply),
        })
    }

    fn reset(&mut self) -> Result<()> {
        if !self.open {
            return Err(Error::SourceUnavailable(format!(
                "connection to {} is closed",
                self.server
            )));
        }
        self.send(RESET_REQUEST)?;
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            log::debug!("Closed connection to {}", self.server);
        }
    }
}
