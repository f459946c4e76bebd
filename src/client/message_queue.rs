//! Message queue client
//!
//! Shutdown protocol:
//! 1. `stop` publishes `SENTINEL` to the `SENTINEL` topic. The client
//!    subscribed to it in `start`, so a broker that routes it lets every
//!    consumer of this queue observe the shutdown as a normal delivery.
//! 2. The shutdown flag flips to `true` under its own lock. It never resets.
//! 3. `Outgoing::Shutdown` goes on the outgoing queue behind everything
//!    already queued. The sender flushes those requests, then exits when it
//!    pops the marker, so a sender blocked in `pop` always wakes.
//! 4. Both flows are joined.
//! 5. `Delivery::Shutdown` goes on the incoming queue, so a `retrieve`
//!    blocked on an empty queue returns `None` even if the broker never
//!    echoed the sentinel.

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use super::flows;
use crate::config::{ClientSettings, Settings};
use crate::queue::BlockingQueue;
use crate::request::{Method, Request};
use crate::transport::{Connector, TcpConnector};
use crate::utils::error::{MqError, Result};

/// Reserved topic and payload used to signal shutdown through the broker.
pub const SENTINEL: &str = "SHUTDOWN";

// Longest single sleep while pausing, so a pausing flow notices shutdown.
const PAUSE_SLICE: Duration = Duration::from_millis(50);

/// Item on the outgoing queue.
#[derive(Debug)]
pub(super) enum Outgoing {
    Request(Request),
    Shutdown,
}

/// Item on the incoming queue.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Delivery {
    Message(String),
    Shutdown,
}

/// How long the background flows wait before trying again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After a failed connect.
    pub retry: Duration,
    /// After a poll that delivered nothing.
    pub poll: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            retry: Duration::from_millis(250),
            poll: Duration::from_millis(100),
        }
    }
}

impl From<&ClientSettings> for Pacing {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            retry: settings.retry_interval(),
            poll: settings.poll_interval(),
        }
    }
}

/// State shared between the handle and both flows.
pub(super) struct Shared<C> {
    pub(super) name: String,
    pub(super) host: String,
    pub(super) port: u16,
    pub(super) connector: C,
    pub(super) pacing: Pacing,
    pub(super) outgoing: BlockingQueue<Outgoing>,
    pub(super) incoming: BlockingQueue<Delivery>,
    shutdown: Mutex<bool>,
}

impl<C> Shared<C> {
    pub(super) fn is_shutdown(&self) -> bool {
        *self
            .shutdown
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn mark_shutdown(&self) {
        *self
            .shutdown
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = true;
    }

    /// Sleep for `total`, returning early once shutdown is requested.
    pub(super) fn pause(&self, total: Duration) {
        let deadline = Instant::now() + total;
        while !self.is_shutdown() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep((deadline - now).min(PAUSE_SLICE));
        }
    }
}

struct Workers {
    sender: JoinHandle<()>,
    receiver: JoinHandle<()>,
}

/// Client for one named delivery queue on a broker.
///
/// `publish`, `subscribe` and `unsubscribe` only enqueue; they never touch
/// the network and never fail. `retrieve` blocks until a message arrives or
/// the client is stopped.
pub struct MessageQueue<C: Connector = TcpConnector> {
    shared: Arc<Shared<C>>,
    workers: Mutex<Option<Workers>>,
}

impl MessageQueue<TcpConnector> {
    /// Client named `name` talking to the broker at `host:port` over TCP.
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self::with_connector(name, host, port, TcpConnector::new(), Pacing::default())
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_connector(
            settings.client.name.clone(),
            settings.broker.host.clone(),
            settings.broker.port,
            TcpConnector::with_timeout(settings.client.io_timeout()),
            Pacing::from(&settings.client),
        )
    }
}

impl<C: Connector> MessageQueue<C> {
    pub fn with_connector(
        name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        connector: C,
        pacing: Pacing,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                name: name.into(),
                host: host.into(),
                port,
                connector,
                pacing,
                outgoing: BlockingQueue::new(),
                incoming: BlockingQueue::new(),
                shutdown: Mutex::new(false),
            }),
            workers: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn host(&self) -> &str {
        &self.shared.host
    }

    pub fn port(&self) -> u16 {
        self.shared.port
    }

    /// Queue `body` for publication on `topic`.
    pub fn publish(&self, topic: &str, body: impl Into<String>) {
        self.send(Request::new(Method::Put, topic_uri(topic), Some(body.into())));
    }

    /// Queue a subscription of this client's queue to `topic`.
    pub fn subscribe(&self, topic: &str) {
        self.send(Request::new(
            Method::Put,
            subscription_uri(&self.shared.name, topic),
            None,
        ));
    }

    /// Queue removal of this client's subscription to `topic`.
    pub fn unsubscribe(&self, topic: &str) {
        self.send(Request::new(
            Method::Delete,
            subscription_uri(&self.shared.name, topic),
            None,
        ));
    }

    /// Spawn the sender and receiver flows, then subscribe to `SENTINEL`.
    ///
    /// Starting a running client is a no-op. Starting a stopped client fails
    /// with `MqError::Shutdown`.
    pub fn start(&self) -> Result<()> {
        let mut workers = self.lock_workers();
        if self.shared.is_shutdown() {
            return Err(MqError::Shutdown);
        }
        if workers.is_some() {
            warn!("{} already started", self.shared.name);
            return Ok(());
        }

        let sender = self.spawn("sender", flows::run_sender::<C>)?;
        let receiver = match self.spawn("receiver", flows::run_receiver::<C>) {
            Ok(handle) => handle,
            Err(e) => {
                self.shared.mark_shutdown();
                self.shared.outgoing.push(Outgoing::Shutdown);
                join("sender", sender);
                self.shared.incoming.push(Delivery::Shutdown);
                return Err(e);
            }
        };
        *workers = Some(Workers { sender, receiver });
        drop(workers);

        self.subscribe(SENTINEL);
        info!(
            "{} started against {}:{}",
            self.shared.name, self.shared.host, self.shared.port
        );
        Ok(())
    }

    /// Take the next delivered message, blocking until one arrives.
    ///
    /// Returns `None` once the client is stopped or when the delivery is the
    /// shutdown sentinel.
    pub fn retrieve(&self) -> Option<String> {
        match self.shared.incoming.pop() {
            Delivery::Message(body) if body == SENTINEL => None,
            Delivery::Message(body) => Some(body),
            Delivery::Shutdown => {
                // Put the marker back so every later retrieve also returns.
                self.shared.incoming.push(Delivery::Shutdown);
                None
            }
        }
    }

    /// Shut the client down and wait for both flows to finish.
    ///
    /// Requests queued before `stop` are still sent if the broker is
    /// reachable. Calling `stop` again, or before `start`, is harmless.
    pub fn stop(&self) {
        let mut workers = self.lock_workers();
        if self.shared.is_shutdown() {
            return;
        }

        self.publish(SENTINEL, SENTINEL);
        self.shared.mark_shutdown();
        self.shared.outgoing.push(Outgoing::Shutdown);

        if let Some(Workers { sender, receiver }) = workers.take() {
            join("sender", sender);
            join("receiver", receiver);
        }
        self.shared.incoming.push(Delivery::Shutdown);
        info!("{} stopped", self.shared.name);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.is_shutdown()
    }

    fn send(&self, request: Request) {
        self.shared.outgoing.push(Outgoing::Request(request));
    }

    fn spawn(&self, role: &'static str, flow: fn(Arc<Shared<C>>)) -> Result<JoinHandle<()>> {
        let shared = Arc::clone(&self.shared);
        thread::Builder::new()
            .name(format!("mq-{role}-{}", self.shared.name))
            .spawn(move || flow(shared))
            .map_err(|source| MqError::Spawn { name: role, source })
    }

    fn lock_workers(&self) -> MutexGuard<'_, Option<Workers>> {
        self.workers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    pub(super) fn shared(&self) -> &Shared<C> {
        &self.shared
    }
}

impl<C: Connector> Drop for MessageQueue<C> {
    fn drop(&mut self) {
        let running = self
            .workers
            .get_mut()
            .map(|workers| workers.is_some())
            .unwrap_or(true);
        if running {
            self.stop();
        }
    }
}

fn join(role: &str, handle: JoinHandle<()>) {
    if handle.join().is_err() {
        error!("{role} flow panicked");
    }
}

pub(super) fn topic_uri(topic: &str) -> String {
    format!("/topic/{topic}")
}

pub(super) fn subscription_uri(name: &str, topic: &str) -> String {
    format!("/subscription/{name}/{topic}")
}

pub(super) fn queue_uri(name: &str) -> String {
    format!("/queue/{name}")
}
