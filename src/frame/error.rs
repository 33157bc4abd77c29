//! Errors raised while lexing inbound frames.

use thiserror::Error;

/// Reasons a raw transport message could not be read as a [`Frame`](super::Frame).
///
/// Decode failures never tear the session down; the session loop logs and
/// discards the offending message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The transport delivered an empty message.
    #[error("empty frame")]
    Empty,
    /// The first byte is not an ASCII digit.
    #[error("frame does not start with a packet type digit (found {found:#04x})")]
    MissingPacketType {
        /// Byte found where the packet type digit was expected.
        found: u8,
    },
    /// The packet type digit is outside the supported range.
    #[error("unknown packet type '{}'", char::from(*.0))]
    UnknownPacketType(u8),
    /// A message packet lacks its sub-type digit.
    #[error("message frame without a message kind")]
    MissingMessageKind,
    /// The message sub-type digit is outside the supported range.
    #[error("unknown message kind '{}'", char::from(*.0))]
    UnknownMessageKind(u8),
    /// The correlation identifier does not fit in a `u64`.
    #[error("correlation id {digits} is out of range")]
    CorrelationIdOverflow {
        /// Digits as they appeared on the wire.
        digits: String,
    },
}
