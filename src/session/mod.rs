//! Session loop driving one auto-reconnecting connection.
//!
//! The loop is the only owner of session state. It dials with back-off,
//! then multiplexes over a shutdown token, the ping timer, inbound frames
//! from the reader task, and queued send requests using a biased
//! `tokio::select!`. Any terminal condition tears the transport down, fails
//! outstanding replies, and either dials again or stops for good.

mod active;
mod backoff;
mod counter;
mod dispatch;
mod event;
mod keepalive;
mod pending;
mod reader;
mod state;

use active::ActiveSession;
use backoff::ReconnectBackoff;
use bytes::Bytes;
use counter::LiveSession;
pub use counter::active_session_count;
use event::{Event, Flow};
pub(crate) use pending::ReplySlot;
use reader::Reader;
pub use state::SessionPhase;
use tokio::{sync::mpsc, time};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{
    config::ConnectionOptions,
    message::IncomingMessage,
    metrics,
    transport::{Dialer, Transport, TransportError},
};

/// A command body queued for the session loop, with its reply slot.
#[derive(Debug)]
pub(crate) struct SendRequest {
    pub(crate) body: Bytes,
    pub(crate) reply: ReplySlot,
}

/// Channel ends owned by the session loop.
pub(crate) struct SessionChannels {
    pub(crate) outbox: mpsc::Receiver<SendRequest>,
    pub(crate) connects: mpsc::Sender<()>,
    pub(crate) messages: mpsc::Sender<IncomingMessage>,
}

/// Actor owning one connection's sessions.
pub(crate) struct SessionLoop<D> {
    url: String,
    dialer: D,
    options: ConnectionOptions,
    outbox: mpsc::Receiver<SendRequest>,
    connects: mpsc::Sender<()>,
    messages: mpsc::Sender<IncomingMessage>,
    shutdown: CancellationToken,
    backoff: ReconnectBackoff,
    phase: SessionPhase,
}

impl<D: Dialer> SessionLoop<D> {
    /// `options` are expected to be normalized.
    pub(crate) fn new(
        url: String,
        dialer: D,
        options: ConnectionOptions,
        channels: SessionChannels,
        shutdown: CancellationToken,
    ) -> Self {
        let SessionChannels {
            outbox,
            connects,
            messages,
        } = channels;
        Self {
            url,
            dialer,
            backoff: ReconnectBackoff::new(options.backoff_value()),
            options,
            outbox,
            connects,
            messages,
            shutdown,
            phase: SessionPhase::Idle,
        }
    }

    /// Dial, serve and redial until shutdown.
    ///
    /// Consumes the loop; dropping it on return closes both consumer
    /// channels.
    pub(crate) async fn run(mut self) {
        let span = info_span!(
            "rtwire.session",
            label = self.options.label_value().unwrap_or("rtwire"),
            url = %self.url,
        );
        async move {
            loop {
                self.enter(SessionPhase::Dialing);
                let Some(transport) = self.dial_until_connected().await else {
                    break;
                };
                self.backoff.reset();
                if self.run_session(transport).await == Flow::Shutdown {
                    break;
                }
            }
            self.enter(SessionPhase::Closed);
            info!("connection closed");
        }
        .instrument(span)
        .await;
    }

    fn enter(&mut self, next: SessionPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid session transition {} -> {next}",
            self.phase
        );
        debug!(from = %self.phase, to = %next, "session phase");
        self.phase = next;
    }

    /// Dial until a transport is up, backing off between failures.
    ///
    /// Returns `None` if shutdown is requested first.
    async fn dial_until_connected(&mut self) -> Option<Transport> {
        let dial_timeout = self.options.dial_timeout_value();
        loop {
            if self.shutdown.is_cancelled() {
                return None;
            }
            info!("dialing");
            let attempt = time::timeout(dial_timeout, self.dialer.dial(&self.url));
            let result = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => return None,
                res = attempt => res.unwrap_or(Err(TransportError::DialTimeout(dial_timeout))),
            };
            let err = match result {
                Ok(transport) => return Some(transport),
                Err(err) => err,
            };

            metrics::inc_dial_failures();
            let delay = self.backoff.current();
            warn!(error = %err, retry_in = ?delay, "dial failed");
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => return None,
                () = time::sleep(delay) => {}
            }
            self.backoff.advance();
        }
    }

    /// Serve one transport until it fails or shutdown is requested.
    async fn run_session(&mut self, transport: Transport) -> Flow {
        self.enter(SessionPhase::Active);
        let _live = LiveSession::new();
        let (sink, source) = transport.into_parts();
        let mut session = ActiveSession::new(sink, self.options.ping_interval_value());
        info!("connected");

        let flow = if self.notify_connected().await {
            let mut reader = Reader::spawn(source);
            let flow = self.serve(&mut session, &mut reader).await;
            drop(reader);
            flow
        } else {
            Flow::Shutdown
        };

        self.enter(SessionPhase::TearingDown);
        session.teardown().await;
        info!(reconnect = flow == Flow::Reconnect, "session ended");
        flow
    }

    async fn serve(&mut self, session: &mut ActiveSession, reader: &mut Reader) -> Flow {
        loop {
            let event = self.next_event(session, reader).await;
            match self.handle_event(event, session).await {
                Flow::Continue => {}
                flow => return flow,
            }
        }
    }

    /// Await the next ready event using biased priority ordering.
    ///
    /// Shutdown is observed first, then the ping timer, inbound frames and
    /// finally queued sends.
    async fn next_event(&mut self, session: &mut ActiveSession, reader: &mut Reader) -> Event {
        tokio::select! {
            biased;

            () = self.shutdown.cancelled() => Event::Shutdown,
            () = session.keepalive_tick() => Event::PingTick,
            frame = reader.recv() => Event::Inbound(frame),
            request = self.outbox.recv() => Event::Outbound(request),
        }
    }

    /// Hand one connect signal to the consumer. Returns `false` on shutdown.
    ///
    /// The signal is only queued once the consumer has taken every event of
    /// the previous session, so a connect never overtakes stale events.
    async fn notify_connected(&self) -> bool {
        let notify = async {
            drop(self.messages.reserve().await);
            self.connects.send(()).await
        };
        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => false,
            res = notify => {
                if res.is_err() {
                    debug!("connect notification dropped: no receiver");
                }
                true
            }
        }
    }
}
