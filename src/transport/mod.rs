//! Transport acquisition for the session loop.
//!
//! A [`Dialer`] opens one instance of the underlying streaming connection and
//! hands back a [`Transport`]: a sink for outbound frames and a stream of
//! inbound frames, one frame per transport message. The session loop owns
//! the sink; the reader task owns the stream.

mod error;
mod websocket;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Sink, Stream, stream::BoxStream};

pub use error::TransportError;
pub use websocket::WebSocketDialer;

/// Write half of a transport.
pub type FrameSink = Pin<Box<dyn Sink<Bytes, Error = TransportError> + Send>>;

/// Read half of a transport. The stream ends when the peer closes.
pub type FrameSource = BoxStream<'static, Result<Bytes, TransportError>>;

/// One established connection, split into its two halves.
pub struct Transport {
    sink: FrameSink,
    source: FrameSource,
}

impl Transport {
    /// Wrap a sink and a stream into a transport.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytes::Bytes;
    /// use futures::{SinkExt, channel::mpsc, stream};
    /// use rtwire::transport::{Transport, TransportError};
    ///
    /// let (tx, _rx) = mpsc::unbounded::<Bytes>();
    /// let sink = tx.sink_map_err(TransportError::write);
    /// let source = stream::empty::<Result<Bytes, TransportError>>();
    /// let _transport = Transport::new(sink, source);
    /// ```
    pub fn new<Si, St>(sink: Si, source: St) -> Self
    where
        Si: Sink<Bytes, Error = TransportError> + Send + 'static,
        St: Stream<Item = Result<Bytes, TransportError>> + Send + 'static,
    {
        Self {
            sink: Box::pin(sink),
            source: Box::pin(source),
        }
    }

    /// Split the transport into its write and read halves.
    #[must_use]
    pub fn into_parts(self) -> (FrameSink, FrameSource) { (self.sink, self.source) }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport").finish_non_exhaustive()
    }
}

/// Opens transports to a URL.
///
/// Implementations perform pure resource acquisition: no protocol traffic is
/// exchanged beyond what the transport itself needs. The session loop bounds
/// every call with its dial timeout, so implementations must be
/// cancellation-safe.
#[async_trait]
pub trait Dialer: Send + Sync + 'static {
    /// Open a new transport to `url`.
    async fn dial(&self, url: &str) -> Result<Transport, TransportError>;
}
