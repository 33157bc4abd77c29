//! WebSocket transport built on `tokio-tungstenite`.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{
    SinkExt,
    StreamExt,
    future,
    stream::{self, SplitStream},
};
use log::debug;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use super::{Dialer, Transport, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Dials `ws://` and `wss://` URLs.
///
/// Each frame travels as one text message. Control messages are answered by
/// the WebSocket layer and never surface as frames; a close message ends the
/// inbound stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebSocketDialer;

impl WebSocketDialer {
    /// Create a dialer.
    #[must_use]
    pub const fn new() -> Self { Self }
}

#[async_trait]
impl Dialer for WebSocketDialer {
    async fn dial(&self, url: &str) -> Result<Transport, TransportError> {
        let (ws, _response) = connect_async(url).await.map_err(TransportError::dial)?;
        let (write, read) = ws.split();
        let sink = write
            .sink_map_err(TransportError::write)
            .with(|frame: Bytes| future::ready(text_message(frame)));
        Ok(Transport::new(sink, inbound_frames(read)))
    }
}

fn text_message(frame: Bytes) -> Result<Message, TransportError> {
    let text = String::from_utf8(frame.to_vec()).map_err(TransportError::write)?;
    Ok(Message::text(text))
}

fn inbound_frames(
    read: SplitStream<WsStream>,
) -> impl futures::Stream<Item = Result<Bytes, TransportError>> + Send + 'static {
    stream::unfold(Some(read), |state| async move {
        let mut read = state?;
        loop {
            match read.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Some((Ok(Bytes::copy_from_slice(text.as_bytes())), Some(read)));
                }
                Some(Ok(Message::Binary(data))) => {
                    return Some((Ok(Bytes::copy_from_slice(&data)), Some(read)));
                }
                Some(Ok(Message::Close(close))) => {
                    debug!("websocket closed by peer: {close:?}");
                    return None;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => return Some((Err(TransportError::read(err)), None)),
                None => return None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_travel_as_text_messages() {
        let message = text_message(Bytes::from_static(b"2")).expect("utf-8 frame");
        assert_eq!(message, Message::text("2"));
    }

    #[test]
    fn non_utf8_frames_fail_to_write() {
        let err = text_message(Bytes::from_static(&[0xff, 0xfe])).expect_err("invalid utf-8");
        assert!(matches!(err, TransportError::Write(_)));
    }

    #[tokio::test]
    async fn unreachable_hosts_fail_to_dial() {
        let err = WebSocketDialer::new()
            .dial("ws://127.0.0.1:9/socket.io/")
            .await
            .expect_err("nothing listens on the discard port");
        assert!(matches!(err, TransportError::Dial(_)));
    }
}
