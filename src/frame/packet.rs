//! Packet and message type digits carried at the front of every frame.

use std::fmt;

/// Transport-level packet type, the mandatory first digit of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PacketType {
    /// Server handshake carrying the session parameters.
    Open,
    /// Transport close request.
    Close,
    /// Keepalive ping written by the client.
    Ping,
    /// Keepalive answer from the server.
    Pong,
    /// Application message; always followed by a [`MessageKind`] digit.
    Message,
}

impl PacketType {
    /// Parse a packet type from its ASCII digit.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtwire::frame::PacketType;
    ///
    /// assert_eq!(PacketType::from_digit(b'4'), Some(PacketType::Message));
    /// assert_eq!(PacketType::from_digit(b'7'), None);
    /// ```
    #[must_use]
    pub const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            b'0' => Some(Self::Open),
            b'1' => Some(Self::Close),
            b'2' => Some(Self::Ping),
            b'3' => Some(Self::Pong),
            b'4' => Some(Self::Message),
            _ => None,
        }
    }

    /// Return the ASCII digit encoding this packet type.
    #[must_use]
    pub const fn digit(self) -> u8 {
        match self {
            Self::Open => b'0',
            Self::Close => b'1',
            Self::Ping => b'2',
            Self::Pong => b'3',
            Self::Message => b'4',
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Ping => "ping",
            Self::Pong => "pong",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Sub-type of a [`PacketType::Message`] frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Namespace connect acknowledgement.
    Connect,
    /// Namespace disconnect.
    Disconnect,
    /// Pushed event, or an outgoing command when sent by the client.
    Event,
    /// Reply correlated with an earlier command.
    Reply,
    /// Server-side error notice.
    Error,
}

impl MessageKind {
    /// Parse a message kind from its ASCII digit.
    #[must_use]
    pub const fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            b'0' => Some(Self::Connect),
            b'1' => Some(Self::Disconnect),
            b'2' => Some(Self::Event),
            b'3' => Some(Self::Reply),
            b'4' => Some(Self::Error),
            _ => None,
        }
    }

    /// Return the ASCII digit encoding this message kind.
    #[must_use]
    pub const fn digit(self) -> u8 {
        match self {
            Self::Connect => b'0',
            Self::Disconnect => b'1',
            Self::Event => b'2',
            Self::Reply => b'3',
            Self::Error => b'4',
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Event => "event",
            Self::Reply => "reply",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
