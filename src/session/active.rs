//! State of one live transport session.

use std::time::Duration;

use bytes::Bytes;
use futures::SinkExt;
use tokio::time;
use tracing::{debug, warn};

use super::{Flow, SendRequest, keepalive::Keepalive, pending::PendingReplies};
use crate::{
    correlation::CorrelationIds,
    frame::Frame,
    message::Handshake,
    metrics::{self, Direction},
    transport::{FrameSink, TransportError},
};

/// Upper bound on closing a transport during teardown.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Per-transport state, rebuilt on every connect.
///
/// A fresh session starts its correlation ids at 1 and pings at the
/// configured default cadence until the server announces its own.
pub(super) struct ActiveSession {
    sink: FrameSink,
    ids: CorrelationIds,
    pending: PendingReplies,
    keepalive: Keepalive,
}

impl ActiveSession {
    pub(super) fn new(sink: FrameSink, ping_interval: Duration) -> Self {
        Self {
            sink,
            ids: CorrelationIds::default(),
            pending: PendingReplies::default(),
            keepalive: Keepalive::new(ping_interval),
        }
    }

    pub(super) async fn keepalive_tick(&mut self) { self.keepalive.tick().await; }

    async fn write(&mut self, frame: &Frame) -> Result<(), TransportError> {
        let raw = frame.encode();
        debug!(frame = %String::from_utf8_lossy(&raw), "sending frame");
        self.sink.send(raw).await?;
        metrics::inc_frames(Direction::Outbound);
        Ok(())
    }

    /// Write a ping and schedule the next one.
    pub(super) async fn ping(&mut self) -> Flow {
        debug!(interval = ?self.keepalive.interval(), "ping");
        match self.write(&Frame::ping()).await {
            Ok(()) => {
                self.keepalive.reschedule();
                Flow::Continue
            }
            Err(err) => {
                warn!(error = %err, "ping write failed");
                Flow::Reconnect
            }
        }
    }

    /// Adopt the ping cadence from an open packet payload.
    pub(super) fn adopt_handshake(&mut self, payload: &[u8]) {
        match Handshake::from_json(payload) {
            Ok(handshake) if handshake.ping_interval == 0 => {
                debug!(sid = ?handshake.sid, "handshake without ping interval; keeping cadence");
            }
            Ok(handshake) => {
                debug!(
                    sid = ?handshake.sid,
                    ping_interval = ?handshake.ping_interval(),
                    ping_timeout = ?handshake.ping_timeout,
                    upgrades = ?handshake.upgrades,
                    "handshake received"
                );
                self.keepalive.adopt(handshake.ping_interval());
            }
            Err(err) => warn!(error = %err, "discarding malformed handshake"),
        }
    }

    /// Route a reply frame to the request waiting on its id.
    pub(super) fn deliver_reply(&mut self, correlation_id: Option<u64>, payload: Bytes) {
        let Some(id) = correlation_id else {
            debug!("discarding reply without correlation id");
            return;
        };
        if !self.pending.fulfil(id, payload) {
            debug!(correlation_id = id, "discarding reply for unknown request");
        }
    }

    /// Stamp a queued request with the next id and write it.
    pub(super) async fn dispatch(&mut self, request: SendRequest) -> Flow {
        let SendRequest { body, reply } = request;
        if reply.is_closed() {
            debug!("dropping request abandoned by its caller");
            return Flow::Continue;
        }
        let id = self.ids.next_id();
        if self.pending.evict(id) {
            warn!(correlation_id = id, "correlation id reused; failing stale request");
        }
        match self.write(&Frame::command(id, body)).await {
            Ok(()) => {
                self.pending.register(id, reply);
                debug!(correlation_id = id, pending = self.pending.len(), "request sent");
                Flow::Continue
            }
            Err(err) => {
                warn!(correlation_id = id, error = %err, "request write failed");
                let _ = reply.send(None);
                Flow::Reconnect
            }
        }
    }

    /// Fail outstanding replies and release the transport.
    pub(super) async fn teardown(mut self) {
        let failed = self.pending.fail_all();
        if failed > 0 {
            debug!(failed, "failed pending replies");
        }
        match time::timeout(CLOSE_TIMEOUT, self.sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => debug!(error = %err, "transport close failed"),
            Err(_) => debug!("transport close timed out"),
        }
    }
}
