//! Errors returned to callers of [`Connection::send`](super::Connection::send).

use std::time::Duration;

use thiserror::Error;

/// Why a command did not produce a reply.
#[derive(Debug, Error)]
pub enum SendError {
    /// The command payload could not be serialized to JSON.
    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),
    /// No reply arrived within the reply timeout. The session is unaffected.
    #[error("no reply within {timeout:?}")]
    ReplyTimeout {
        /// Timeout that elapsed.
        timeout: Duration,
    },
    /// The session ended, or the connection was closed, before the reply
    /// arrived.
    #[error("session closed before the reply arrived")]
    SessionClosed,
}

impl SendError {
    /// Returns `true` if the failure is a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool { matches!(self, Self::ReplyTimeout { .. }) }
}
