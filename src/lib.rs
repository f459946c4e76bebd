//! # mqclient
//!
//! `mqclient` is the client side of a small topic-based publish/subscribe
//! system. It talks to a broker over a plain-text HTTP/1.0-style protocol,
//! one request per connection, and keeps network I/O off the caller's
//! thread with two background flows and a pair of blocking queues.
//!
//! ## Core Modules
//!
//! - `client`: the `MessageQueue` client and its sender/receiver flows.
//! - `queue`: the blocking FIFO shared between the caller and the flows.
//! - `request`: the request value and its wire encoding/decoding.
//! - `transport`: the `Connector` seam and its TCP implementation.
//! - `config`: loading client settings from files and the environment.
//! - `utils`: error types and logging setup.
//!
//! ```no_run
//! use mqclient::MessageQueue;
//!
//! let mq = MessageQueue::new("alice", "127.0.0.1", 9000);
//! mq.subscribe("chat");
//! mq.start()?;
//! mq.publish("chat", "hello");
//! if let Some(message) = mq.retrieve() {
//!     println!("{message}");
//! }
//! mq.stop();
//! # Ok::<(), mqclient::MqError>(())
//! ```

pub mod client;
pub mod config;
pub mod queue;
pub mod request;
pub mod transport;
pub mod utils;

pub use client::{MessageQueue, Pacing, SENTINEL};
pub use utils::error::{MqError, Result};
