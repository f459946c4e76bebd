//! Wire format
//!
//! Requests are written as
//!
//! ```text
//! <METHOD> <URI> HTTP/1.0\r\n
//! Content-Length: <N>\r\n
//! \r\n
//! <BODY>
//! ```
//!
//! with `N` the byte length of the body. Responses are read the same way:
//! a status line, header lines up to a bare `\r\n`, then exactly
//! `Content-Length` bytes. The body is always read by length, never by line,
//! so payloads containing `\r\n` come through intact.

use std::io::{self, BufRead, Read, Write};

use super::{Method, Request};
use crate::utils::error::{MqError, Result};

const VERSION: &str = "HTTP/1.0";
const OK: &str = "200 OK";

// Longest status or header line accepted, terminator included.
const MAX_LINE: u64 = 8 * 1024;

impl Request {
    /// Serialize this request onto `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let body = self.body().unwrap_or_default();
        write!(
            writer,
            "{} {} {VERSION}\r\nContent-Length: {}\r\n\r\n",
            self.method,
            self.uri,
            body.len()
        )?;
        writer.write_all(body.as_bytes())?;
        writer.flush()
    }

    /// Parse one request from `reader`.
    ///
    /// A zero `Content-Length` (or none at all) yields a request without a
    /// body.
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Self> {
        let line = read_line(reader)?.ok_or(MqError::ConnectionClosed)?;
        let mut parts = line.split_whitespace();
        let (Some(method), Some(uri), Some(_version)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(MqError::Malformed(line.clone()));
        };
        let method = method.parse::<Method>()?;
        let uri = uri.to_string();

        let length = read_headers(reader)?.unwrap_or(0);
        let body = read_body(reader, length)?;
        Ok(Request::new(method, uri, body))
    }
}

/// Read a broker response and return the delivered body, if any.
///
/// Anything but a `200 OK` status drains the rest of the stream and returns
/// `MqError::Status`. A `200 OK` with an empty body yields `Ok(None)`.
pub fn read_delivery<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let status = read_status(reader)?;
    if !is_ok(&status) {
        drain(reader)?;
        return Err(MqError::Status(status));
    }

    let length = read_headers(reader)?.ok_or(MqError::MissingContentLength)?;
    read_body(reader, length)
}

/// Read the status line of a response, without its terminator.
pub fn read_status<R: BufRead>(reader: &mut R) -> Result<String> {
    read_line(reader)?.ok_or(MqError::ConnectionClosed)
}

/// Whether `status` reports success. Only the literal `200 OK` counts.
pub fn is_ok(status: &str) -> bool {
    status.contains(OK)
}

/// Read and discard everything up to end of stream.
pub fn drain<R: BufRead>(reader: &mut R) -> io::Result<u64> {
    io::copy(reader, &mut io::sink())
}

// Returns the line without its terminator, or None at end of stream.
fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = reader.by_ref().take(MAX_LINE).read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    if read as u64 == MAX_LINE && !line.ends_with('\n') {
        return Err(MqError::Malformed(format!("line exceeds {MAX_LINE} bytes")));
    }
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}

// Consumes headers through the blank line and returns Content-Length.
fn read_headers<R: BufRead>(reader: &mut R) -> Result<Option<usize>> {
    let mut length = None;
    loop {
        let line = read_line(reader)?.ok_or(MqError::ConnectionClosed)?;
        if line.is_empty() {
            return Ok(length);
        }

        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            let value = value.trim();
            let parsed = value
                .parse::<usize>()
                .map_err(|_| MqError::InvalidContentLength(value.to_string()))?;
            length = Some(parsed);
        }
    }
}

fn read_body<R: BufRead>(reader: &mut R, length: usize) -> Result<Option<String>> {
    if length == 0 {
        return Ok(None);
    }
    // Grows with what actually arrives, not with what the peer announced.
    let mut body = Vec::new();
    reader.by_ref().take(length as u64).read_to_end(&mut body)?;
    if body.len() < length {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("body ended after {} of {length} bytes", body.len()),
        )
        .into());
    }
    Ok(Some(String::from_utf8(body)?))
}
