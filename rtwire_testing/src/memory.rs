//! In-memory transport with scripted failures.

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{SinkExt, StreamExt, channel::mpsc as fmpsc, future};
use rtwire::{Dialer, Transport, TransportError};
use tokio::sync::mpsc;

/// Outcome of one scripted dial attempt.
#[derive(Clone, Debug)]
enum DialOutcome {
    Fail(String),
    Hang,
}

#[derive(Debug, Default)]
struct DialScript {
    outcomes: Mutex<VecDeque<DialOutcome>>,
    attempts: AtomicUsize,
}

/// A [`Dialer`] whose transports are in-memory channel pairs.
///
/// Dials succeed by default; [`fail_next`](Self::fail_next) and
/// [`hang_next`](Self::hang_next) queue failures for upcoming attempts.
#[derive(Clone, Debug)]
pub struct MemoryDialer {
    script: Arc<DialScript>,
    accepted: mpsc::UnboundedSender<ServerEnd>,
}

/// Receives the server end of every transport the dialer establishes.
#[derive(Debug)]
pub struct MemoryServer {
    script: Arc<DialScript>,
    accepted: mpsc::UnboundedReceiver<ServerEnd>,
}

impl MemoryDialer {
    /// Create a dialer and the server that observes its connections.
    #[must_use]
    pub fn with_server() -> (Self, MemoryServer) {
        let script = Arc::new(DialScript::default());
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                script: Arc::clone(&script),
                accepted: tx,
            },
            MemoryServer {
                script,
                accepted: rx,
            },
        )
    }

    /// Make the next `count` dial attempts fail immediately.
    ///
    /// # Panics
    ///
    /// Panics if the script lock is poisoned.
    pub fn fail_next(&self, count: usize) {
        let mut outcomes = self.script.outcomes.lock().expect("dial script poisoned");
        outcomes.extend((0..count).map(|n| DialOutcome::Fail(format!("scripted failure {n}"))));
    }

    /// Make the next dial attempt never complete.
    ///
    /// # Panics
    ///
    /// Panics if the script lock is poisoned.
    pub fn hang_next(&self) {
        self.script
            .outcomes
            .lock()
            .expect("dial script poisoned")
            .push_back(DialOutcome::Hang);
    }

    fn next_outcome(&self) -> Option<DialOutcome> {
        self.script.attempts.fetch_add(1, Ordering::SeqCst);
        self.script
            .outcomes
            .lock()
            .expect("dial script poisoned")
            .pop_front()
    }
}

#[async_trait]
impl Dialer for MemoryDialer {
    async fn dial(&self, _url: &str) -> Result<Transport, TransportError> {
        match self.next_outcome() {
            Some(DialOutcome::Fail(reason)) => Err(TransportError::dial(reason)),
            Some(DialOutcome::Hang) => future::pending().await,
            None => {
                let (transport, server) = pair();
                self.accepted
                    .send(server)
                    .map_err(|_| TransportError::dial("memory server dropped"))?;
                Ok(transport)
            }
        }
    }
}

impl MemoryServer {
    /// Wait for the client's next established transport.
    ///
    /// # Panics
    ///
    /// Panics if every dialer has been dropped.
    pub async fn accept(&mut self) -> ServerEnd {
        self.accepted.recv().await.expect("dialer dropped")
    }

    /// Return an established transport if one is waiting.
    pub fn try_accept(&mut self) -> Option<ServerEnd> { self.accepted.try_recv().ok() }

    /// Number of dial attempts made so far, successful or not.
    #[must_use]
    pub fn dial_attempts(&self) -> usize { self.script.attempts.load(Ordering::SeqCst) }
}

/// The server side of one in-memory transport.
#[derive(Debug)]
pub struct ServerEnd {
    inbound: fmpsc::UnboundedReceiver<Bytes>,
    outbound: Option<fmpsc::UnboundedSender<Result<Bytes, TransportError>>>,
    fail_writes: Arc<AtomicBool>,
}

fn pair() -> (Transport, ServerEnd) {
    let (client_tx, inbound) = fmpsc::unbounded::<Bytes>();
    let (outbound, client_rx) = fmpsc::unbounded::<Result<Bytes, TransportError>>();
    let fail_writes = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&fail_writes);
    let sink = client_tx
        .sink_map_err(TransportError::write)
        .with(move |frame: Bytes| {
            future::ready(if flag.load(Ordering::SeqCst) {
                Err(TransportError::write("injected write failure"))
            } else {
                Ok(frame)
            })
        });
    (
        Transport::new(sink, client_rx),
        ServerEnd {
            inbound,
            outbound: Some(outbound),
            fail_writes,
        },
    )
}

impl ServerEnd {
    /// Push a raw frame to the client.
    pub fn send(&self, frame: impl Into<Bytes>) { self.push(Ok(frame.into())); }

    /// Send the open packet announcing `ping_interval_ms`.
    pub fn open(&self, ping_interval_ms: u64) {
        self.send(format!(
            r#"0{{"sid":"memory","upgrades":[],"pingInterval":{ping_interval_ms},"pingTimeout":60000}}"#
        ));
    }

    /// Acknowledge the default namespace.
    pub fn ack_connect(&self) { self.send("40"); }

    /// Push an event `[event_type, payload]`; `payload` must be JSON.
    pub fn event(&self, event_type: &str, payload: &str) {
        self.send(format!(r#"42["{event_type}",{payload}]"#));
    }

    /// Reply to the command carrying `correlation_id`.
    pub fn reply(&self, correlation_id: u64, body: &str) {
        self.send(format!("43{correlation_id}{body}"));
    }

    /// Make the client's next read fail.
    pub fn fail_read(&self) { self.push(Err(TransportError::read("injected read failure"))); }

    /// Make every subsequent client write fail.
    pub fn fail_writes(&self) { self.fail_writes.store(true, Ordering::SeqCst); }

    /// End the client's inbound stream, as a peer close would.
    pub fn close(&mut self) { self.outbound = None; }

    /// Next frame written by the client, as text.
    ///
    /// Returns `None` once the client has closed its side.
    pub async fn recv(&mut self) -> Option<String> {
        self.inbound
            .next()
            .await
            .map(|raw| String::from_utf8_lossy(&raw).into_owned())
    }

    /// Next frame written by the client that is not a ping.
    pub async fn recv_non_ping(&mut self) -> Option<String> {
        loop {
            match self.recv().await {
                Some(frame) if frame == "2" => {}
                other => return other,
            }
        }
    }

    /// Frame already written by the client, if any.
    pub fn try_recv(&mut self) -> Option<String> {
        self.inbound
            .try_next()
            .ok()
            .flatten()
            .map(|raw| String::from_utf8_lossy(&raw).into_owned())
    }

    fn push(&self, item: Result<Bytes, TransportError>) {
        if let Some(outbound) = &self.outbound {
            let _ = outbound.unbounded_send(item);
        }
    }
}
