//! Error types for the message queue client.
//!
//! Only the foreground API surfaces these. The sender and receiver flows log
//! their failures and keep looping, so nothing here ever crosses a thread
//! boundary.

use std::io;
use std::string::FromUtf8Error;

/// Errors produced while talking to the broker or setting up the client.
#[derive(Debug, thiserror::Error)]
pub enum MqError {
    /// I/O error on the underlying stream.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The peer closed the connection before a complete message head arrived.
    #[error("connection closed")]
    ConnectionClosed,

    /// The response status line did not contain `200 OK`.
    #[error("unexpected status: {0}")]
    Status(String),

    /// The header block ended without a `Content-Length` header.
    #[error("missing content-length")]
    MissingContentLength,

    /// `Content-Length` was present but not a single decimal integer.
    #[error("invalid content-length: {0}")]
    InvalidContentLength(String),

    /// The body was not valid UTF-8.
    #[error("invalid body: {0}")]
    InvalidBody(#[from] FromUtf8Error),

    /// A request line could not be parsed.
    #[error("malformed request: {0}")]
    Malformed(String),

    /// The client has already been stopped and cannot be started again.
    #[error("client has been shut down")]
    Shutdown,

    /// Settings could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    /// A background flow could not be spawned.
    #[error("failed to spawn {name} flow: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MqError>;
