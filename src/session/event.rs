//! Internal event types for the session loop select.

use bytes::Bytes;

use super::SendRequest;

/// Events returned by the session loop's multiplexed wait.
#[derive(Debug)]
pub(super) enum Event {
    Shutdown,
    PingTick,
    /// A raw frame from the reader task; `None` once the transport has ended.
    Inbound(Option<Bytes>),
    /// A queued send; `None` once every sender has been dropped.
    Outbound(Option<SendRequest>),
}

/// What the session loop does after handling an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    /// Tear the transport down and dial again.
    Reconnect,
    /// Tear the transport down and stop for good.
    Shutdown,
}
