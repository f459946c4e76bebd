//! Request value and its HTTP/1.0-style wire codec.
//!
//! A `Request` is built once and never mutated. It moves between the
//! foreground caller, the queues and the flows by value, which is what keeps
//! it owned by exactly one party at a time.

pub mod codec;

use std::fmt;
use std::str::FromStr;

use crate::utils::error::MqError;

pub use codec::{drain, is_ok, read_delivery, read_status};

/// The methods the broker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Put,
    Get,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Put => "PUT",
            Method::Get => "GET",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = MqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUT" => Ok(Method::Put),
            "GET" => Ok(Method::Get),
            "DELETE" => Ok(Method::Delete),
            other => Err(MqError::Malformed(format!("unknown method {other:?}"))),
        }
    }
}

/// A single request to the broker.
///
/// `body` is optional and `None` is distinct from `Some("")`; both encode as
/// `Content-Length: 0`.
#[derive(Debug, PartialEq, Eq)]
pub struct Request {
    method: Method,
    uri: String,
    body: Option<String>,
}

impl Request {
    pub fn new(method: Method, uri: impl Into<String>, body: Option<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            body,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Consume the request, handing its body to the caller.
    pub fn into_body(self) -> Option<String> {
        self.body
    }
}
