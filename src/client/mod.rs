//! The `client` module is the message queue client itself.
//!
//! `MessageQueue` turns `publish`/`subscribe`/`unsubscribe` calls into
//! requests on an outgoing queue and hands delivered messages to `retrieve`
//! from an incoming queue. Two background threads do the network work:
//!
//! - the sender pops outgoing requests and sends each on its own connection;
//! - the receiver polls `/queue/<name>` and pushes every delivered body onto
//!   the incoming queue.
//!
//! Subscriptions live only on the broker; the client keeps no record of them.

mod flows;
pub mod message_queue;

pub use message_queue::{MessageQueue, Pacing, SENTINEL};
