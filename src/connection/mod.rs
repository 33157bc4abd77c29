//! Public facade over an auto-reconnecting session.
//!
//! [`Connection::open`] spawns the session loop on the current Tokio runtime
//! and returns immediately. The connection exposes two bounded producers
//! (connect notifications and incoming events) and a request/reply
//! primitive. Both producers hold a single value: a consumer that stops
//! draining them stalls the session loop.

mod error;

use bytes::Bytes;
pub use error::SendError;
use serde::Serialize;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    config::ConnectionOptions,
    message::IncomingMessage,
    metrics,
    session::{SendRequest, SessionChannels, SessionLoop},
    transport::{Dialer, WebSocketDialer},
};

/// Either producer's output, as returned by [`Connection::next_event`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A transport was (re)established.
    Connected,
    /// The server pushed an event.
    Message(IncomingMessage),
}

/// Cloneable handle for issuing commands and closing the connection.
///
/// # Examples
///
/// ```no_run
/// use rtwire::{Connection, ConnectionOptions};
/// use serde_json::json;
///
/// # async fn demo() -> Result<(), rtwire::SendError> {
/// let mut connection = Connection::open(
///     "wss://example.com/socket.io/?EIO=3&transport=websocket",
///     ConnectionOptions::default(),
/// );
/// let handle = connection.handle();
/// while connection.connect_notifications().recv().await.is_some() {
///     let reply = handle.send("auth", &json!({"authToken": "T"})).await?;
///     println!("auth: {}", String::from_utf8_lossy(&reply));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    outbox: mpsc::Sender<SendRequest>,
    shutdown: CancellationToken,
    reply_timeout: time::Duration,
}

impl ConnectionHandle {
    /// Send `[command, payload]` and wait for the correlated reply.
    ///
    /// The whole exchange, including waiting for the session loop to accept
    /// the request, is bounded by the reply timeout. Commands issued while no
    /// transport is up wait for the next connect within that bound.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Encode`] if `payload` cannot be serialized,
    /// [`SendError::ReplyTimeout`] if no reply arrives in time, and
    /// [`SendError::SessionClosed`] if the session ends first.
    pub async fn send<P>(&self, command: &str, payload: &P) -> Result<Bytes, SendError>
    where
        P: Serialize + ?Sized,
    {
        if self.is_closed() {
            return Err(SendError::SessionClosed);
        }
        let body = Bytes::from(serde_json::to_vec(&(command, payload))?);
        let (reply, reply_rx) = oneshot::channel();
        let exchange = async {
            self.outbox
                .send(SendRequest { body, reply })
                .await
                .map_err(|_| SendError::SessionClosed)?;
            reply_rx.await.ok().flatten().ok_or(SendError::SessionClosed)
        };

        if let Ok(result) = time::timeout(self.reply_timeout, exchange).await {
            result
        } else {
            metrics::inc_reply_timeouts();
            debug!(command, timeout = ?self.reply_timeout, "reply timed out");
            Err(SendError::ReplyTimeout {
                timeout: self.reply_timeout,
            })
        }
    }

    /// Request shutdown. Safe to call any number of times.
    pub fn close(&self) { self.shutdown.cancel(); }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.shutdown.is_cancelled() }
}

/// A long-lived, auto-reconnecting session with one server.
///
/// Dropping the connection closes it.
#[derive(Debug)]
pub struct Connection {
    handle: ConnectionHandle,
    connects: mpsc::Receiver<()>,
    messages: mpsc::Receiver<IncomingMessage>,
    task: Option<JoinHandle<()>>,
}

impl Connection {
    /// Open a WebSocket connection to `url`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn open(url: impl Into<String>, options: ConnectionOptions) -> Self {
        Self::open_with(url, WebSocketDialer::new(), options)
    }

    /// Open a connection to `url` using a custom [`Dialer`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn open_with<D: Dialer>(url: impl Into<String>, dialer: D, options: ConnectionOptions) -> Self {
        let options = options.normalized();
        let reply_timeout = options.reply_timeout_value();
        let (outbox_tx, outbox) = mpsc::channel(1);
        let (connects_tx, connects) = mpsc::channel(1);
        let (messages_tx, messages) = mpsc::channel(1);
        let shutdown = CancellationToken::new();

        let session = SessionLoop::new(
            url.into(),
            dialer,
            options,
            SessionChannels {
                outbox,
                connects: connects_tx,
                messages: messages_tx,
            },
            shutdown.clone(),
        );
        let task = tokio::spawn(session.run());

        Self {
            handle: ConnectionHandle {
                outbox: outbox_tx,
                shutdown,
                reply_timeout,
            },
            connects,
            messages,
            task: Some(task),
        }
    }

    /// One value per established transport.
    ///
    /// Yields `None` once the connection has closed for good.
    pub fn connect_notifications(&mut self) -> &mut mpsc::Receiver<()> { &mut self.connects }

    /// One value per event pushed by the server, in arrival order.
    pub fn incoming_messages(&mut self) -> &mut mpsc::Receiver<IncomingMessage> {
        &mut self.messages
    }

    /// Receive from whichever producer is ready.
    ///
    /// A connect notification is never reported before events of the
    /// previous session. Returns `None` once the connection has closed and
    /// both producers are drained.
    pub async fn next_event(&mut self) -> Option<ConnectionEvent> {
        tokio::select! {
            biased;
            Some(()) = self.connects.recv() => Some(ConnectionEvent::Connected),
            Some(message) = self.messages.recv() => Some(ConnectionEvent::Message(message)),
            else => None,
        }
    }

    /// Send `[command, payload]` and wait for the correlated reply.
    ///
    /// # Errors
    ///
    /// See [`ConnectionHandle::send`].
    pub async fn send<P>(&self, command: &str, payload: &P) -> Result<Bytes, SendError>
    where
        P: Serialize + ?Sized,
    {
        self.handle.send(command, payload).await
    }

    /// A cloneable handle for sending from other tasks.
    #[must_use]
    pub fn handle(&self) -> ConnectionHandle { self.handle.clone() }

    /// Request shutdown. Safe to call any number of times.
    pub fn close(&self) { self.handle.close(); }

    /// Returns `true` once the connection has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.handle.is_closed() }

    /// Wait for the session loop to finish.
    ///
    /// Only returns after [`close`](Self::close) has been called (from here
    /// or from a handle).
    pub async fn closed(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        if let Err(err) = task.await {
            warn!(error = %err, "session loop terminated abnormally");
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) { self.handle.close(); }
}
