//! The `queue` module provides the blocking FIFO that decouples the
//! application thread from the background network flows.

pub mod blocking;

pub use blocking::BlockingQueue;

#[cfg(test)]
mod tests;
