//! Event dispatch for the session loop.

use bytes::Bytes;
use tracing::{debug, info, warn};

use super::{ActiveSession, Event, Flow, SessionLoop};
use crate::{
    correlation::CorrelatableFrame,
    frame::{Frame, MessageKind, PacketType},
    message::IncomingMessage,
    metrics::{self, Direction},
    transport::Dialer,
};

impl<D: Dialer> SessionLoop<D> {
    pub(super) async fn handle_event(&mut self, event: Event, session: &mut ActiveSession) -> Flow {
        match event {
            Event::Shutdown => Flow::Shutdown,
            Event::PingTick => session.ping().await,
            Event::Inbound(Some(raw)) => self.handle_frame(raw, session).await,
            Event::Inbound(None) => {
                info!("transport ended");
                Flow::Reconnect
            }
            Event::Outbound(Some(request)) => session.dispatch(request).await,
            Event::Outbound(None) => Flow::Shutdown,
        }
    }

    async fn handle_frame(&mut self, raw: Bytes, session: &mut ActiveSession) -> Flow {
        metrics::inc_frames(Direction::Inbound);
        debug!(frame = %String::from_utf8_lossy(&raw), "received frame");
        let frame = match Frame::parse(raw) {
            Ok(frame) => frame,
            Err(err) => {
                metrics::inc_frame_errors();
                warn!(error = %err, "discarding malformed frame");
                return Flow::Continue;
            }
        };

        match (frame.packet_type(), frame.message_kind()) {
            (PacketType::Open, _) => session.adopt_handshake(frame.payload()),
            (PacketType::Message, Some(MessageKind::Event)) => {
                return self.deliver_event(frame.payload()).await;
            }
            (PacketType::Message, Some(MessageKind::Reply)) => {
                let correlation_id = frame.correlation_id();
                session.deliver_reply(correlation_id, frame.into_payload());
            }
            (PacketType::Pong, _) | (PacketType::Message, Some(MessageKind::Connect)) => {}
            (packet, kind) => debug!(%packet, ?kind, "ignoring frame"),
        }
        Flow::Continue
    }

    /// Hand an event to the consumer, giving way to shutdown.
    async fn deliver_event(&mut self, body: &[u8]) -> Flow {
        let message = match IncomingMessage::from_event_body(body) {
            Ok(message) => message,
            Err(err) => {
                metrics::inc_frame_errors();
                warn!(error = %err, "discarding malformed event");
                return Flow::Continue;
            }
        };
        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => Flow::Shutdown,
            res = self.messages.send(message) => {
                if res.is_err() {
                    debug!("event dropped: no receiver");
                }
                Flow::Continue
            }
        }
    }
}
