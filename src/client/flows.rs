//! Sender and receiver flows.
//!
//! Both run on their own thread with an `Arc` of the client state. Every
//! exchange uses a fresh connection: connect, write one request, read the
//! response, close. Failures are logged and the loop carries on; the only
//! way out is the shutdown protocol in `message_queue`.

use std::io::{BufReader, Read, Write};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::message_queue::{Delivery, Outgoing, Shared, queue_uri};
use crate::request::{Method, Request, drain, is_ok, read_delivery, read_status};
use crate::transport::Connector;
use crate::utils::error::{MqError, Result};

/// Send outgoing requests in FIFO order until the shutdown marker is popped.
pub(super) fn run_sender<C: Connector>(shared: Arc<Shared<C>>) {
    debug!("sender started");
    loop {
        match shared.outgoing.pop() {
            Outgoing::Request(request) => send(&shared, request),
            Outgoing::Shutdown => break,
        }
    }
    debug!("sender stopped");
}

// Retries the connect until it succeeds, so a broker outage loses nothing.
// Once shutdown is requested a failed connect drops the request instead.
fn send<C: Connector>(shared: &Shared<C>, request: Request) {
    let mut attempts = 0u32;
    let stream = loop {
        match shared.connector.connect(&shared.host, shared.port) {
            Ok(stream) => break stream,
            Err(e) if shared.is_shutdown() => {
                warn!(
                    "dropping {} {} during shutdown: {e}",
                    request.method(),
                    request.uri()
                );
                return;
            }
            Err(e) => {
                attempts += 1;
                if attempts == 1 {
                    warn!("connect to {}:{} failed: {e}", shared.host, shared.port);
                } else {
                    debug!(attempts, "connect still failing: {e}");
                }
                shared.pause(shared.pacing.retry);
            }
        }
    };

    if let Err(e) = exchange(stream, &request) {
        warn!("{} {} failed: {e}", request.method(), request.uri());
    }
}

// Writes the request and discards the response.
fn exchange<S: Read + Write>(mut stream: S, request: &Request) -> Result<()> {
    request.write_to(&mut stream)?;

    let mut reader = BufReader::new(stream);
    let status = read_status(&mut reader)?;
    let discarded = drain(&mut reader)?;
    if is_ok(&status) {
        trace!(discarded, "{} {} -> {status}", request.method(), request.uri());
    } else {
        debug!("{} {} -> {status}", request.method(), request.uri());
    }
    Ok(())
}

/// Poll this client's delivery queue until shutdown is requested.
pub(super) fn run_receiver<C: Connector>(shared: Arc<Shared<C>>) {
    debug!("receiver started");
    let uri = queue_uri(&shared.name);
    let mut failures = 0u32;

    while !shared.is_shutdown() {
        let request = Request::new(Method::Get, uri.as_str(), None);

        let stream = match shared.connector.connect(&shared.host, shared.port) {
            Ok(stream) => {
                failures = 0;
                stream
            }
            Err(e) => {
                failures += 1;
                if failures == 1 {
                    warn!("connect to {}:{} failed: {e}", shared.host, shared.port);
                }
                shared.pause(shared.pacing.retry);
                continue;
            }
        };

        match poll(stream, &request) {
            Ok(Some(body)) => {
                trace!(len = body.len(), "message delivered");
                shared.incoming.push(Delivery::Message(body));
            }
            Ok(None) => {
                trace!("empty delivery");
                shared.pause(shared.pacing.poll);
            }
            Err(MqError::Status(status)) => {
                trace!("nothing delivered: {status}");
                shared.pause(shared.pacing.poll);
            }
            Err(e) => {
                warn!("poll of {uri} failed: {e}");
                shared.pause(shared.pacing.poll);
            }
        }
    }
    debug!("receiver stopped");
}

fn poll<S: Read + Write>(mut stream: S, request: &Request) -> Result<Option<String>> {
    request.write_to(&mut stream)?;
    read_delivery(&mut BufReader::new(stream))
}
