//! The `transport` module defines how the client reaches the broker.
//!
//! Each exchange opens a fresh byte stream, writes one request, reads one
//! response and closes. `Connector` is the seam the client is generic over;
//! `TcpConnector` is the production implementation.

pub mod tcp;

use std::io::{self, Read, Write};

pub use tcp::TcpConnector;

/// Opens byte-stream connections to a broker.
///
/// The returned stream is closed by dropping it.
pub trait Connector: Send + Sync + 'static {
    type Stream: Read + Write + Send;

    fn connect(&self, host: &str, port: u16) -> io::Result<Self::Stream>;
}
