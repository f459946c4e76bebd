use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::trace;

use super::Connector;

/// Plain TCP connections, optionally with read/write timeouts.
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    timeout: Option<Duration>,
}

impl TcpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `timeout` to connect, read and write. `None` blocks forever.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        let stream = match self.timeout {
            None => TcpStream::connect((host, port))?,
            Some(timeout) => connect_timeout(host, port, timeout)?,
        };
        stream.set_read_timeout(self.timeout)?;
        stream.set_write_timeout(self.timeout)?;
        trace!("connected to {host}:{port}");
        Ok(stream)
    }
}

// TcpStream::connect_timeout takes a single address, so try each resolved
// one in turn.
fn connect_timeout(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{host}:{port} resolved to no addresses"),
        )
    }))
}
