//! Frame codec for the realtime wire protocol.
//!
//! Every transport message carries exactly one frame:
//!
//! ```text
//! <packet type digit>[<message kind digit>[<correlation id digits>]]<payload>
//! ```
//!
//! Decoding is a small hand-written lexer: read the mandatory packet type
//! digit, then (for message packets only) the kind digit and an optional run
//! of decimal digits forming the correlation identifier. Whatever follows is
//! the opaque payload.

mod error;
mod packet;

use bytes::{BufMut, Bytes, BytesMut};

pub use error::FrameError;
pub use packet::{MessageKind, PacketType};

use crate::correlation::CorrelatableFrame;

/// Longest decimal run that can still fit in a `u64`.
const MAX_ID_DIGITS: usize = 20;

/// One decoded or to-be-encoded protocol frame.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use rtwire::{
///     CorrelatableFrame,
///     frame::{Frame, MessageKind, PacketType},
/// };
///
/// let frame = Frame::parse(Bytes::from_static(b"4312[\"ok\"]")).expect("valid frame");
/// assert_eq!(frame.packet_type(), PacketType::Message);
/// assert_eq!(frame.message_kind(), Some(MessageKind::Reply));
/// assert_eq!(frame.correlation_id(), Some(12));
/// assert_eq!(frame.payload().as_ref(), b"[\"ok\"]");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    packet_type: PacketType,
    message_kind: Option<MessageKind>,
    correlation_id: Option<u64>,
    payload: Bytes,
}

impl Frame {
    /// Create an empty frame of the given packet type.
    #[must_use]
    pub fn new(packet_type: PacketType) -> Self {
        Self {
            packet_type,
            message_kind: None,
            correlation_id: None,
            payload: Bytes::new(),
        }
    }

    /// Create an empty message frame of the given kind.
    #[must_use]
    pub fn message(kind: MessageKind) -> Self {
        Self {
            message_kind: Some(kind),
            ..Self::new(PacketType::Message)
        }
    }

    /// The keepalive ping frame, encoded as `2`.
    #[must_use]
    pub fn ping() -> Self { Self::new(PacketType::Ping) }

    /// An outgoing command frame: `42<id><body>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytes::Bytes;
    /// use rtwire::frame::Frame;
    ///
    /// let frame = Frame::command(7, Bytes::from_static(b"[\"auth\",{}]"));
    /// assert_eq!(frame.encode().as_ref(), b"427[\"auth\",{}]");
    /// ```
    #[must_use]
    pub fn command(correlation_id: u64, body: Bytes) -> Self {
        Self::message(MessageKind::Event)
            .with_correlation_id(correlation_id)
            .with_payload(body)
    }

    /// Attach a correlation identifier.
    ///
    /// Identifiers are only written for message frames; other packet types
    /// have no slot for them on the wire.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: u64) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Replace the payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Bytes) -> Self {
        self.payload = payload;
        self
    }

    /// Packet type of this frame.
    #[must_use]
    pub const fn packet_type(&self) -> PacketType { self.packet_type }

    /// Message kind, present only for [`PacketType::Message`] frames.
    #[must_use]
    pub const fn message_kind(&self) -> Option<MessageKind> { self.message_kind }

    /// Raw payload following the frame header.
    #[must_use]
    pub const fn payload(&self) -> &Bytes { &self.payload }

    /// Consume the frame, returning its payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes { self.payload }

    /// Decode a frame from one transport message.
    ///
    /// The payload is a zero-copy slice of `raw`.
    ///
    /// # Errors
    ///
    /// Returns a [`FrameError`] if the header is missing, uses an unknown
    /// packet type or message kind, or carries a correlation identifier that
    /// does not fit in a `u64`.
    pub fn parse(raw: Bytes) -> Result<Self, FrameError> {
        let mut lexer = Lexer::new(&raw);
        let first = lexer.peek().ok_or(FrameError::Empty)?;
        let digit = lexer
            .digit()
            .ok_or(FrameError::MissingPacketType { found: first })?;
        let packet_type =
            PacketType::from_digit(digit).ok_or(FrameError::UnknownPacketType(digit))?;

        let mut frame = Self::new(packet_type);
        if packet_type == PacketType::Message {
            let kind = lexer.digit().ok_or(FrameError::MissingMessageKind)?;
            frame.message_kind =
                Some(MessageKind::from_digit(kind).ok_or(FrameError::UnknownMessageKind(kind))?);
            let digits = lexer.digits();
            if !digits.is_empty() {
                frame.correlation_id = Some(parse_correlation_id(digits)?);
            }
        }
        frame.payload = raw.slice(lexer.position()..);
        Ok(frame)
    }

    /// Encode the frame into a fresh buffer.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.encoded_len());
        self.encode_into(&mut dst);
        dst.freeze()
    }

    /// Append the encoded frame to `dst`.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        dst.reserve(self.encoded_len());
        dst.put_u8(self.packet_type.digit());
        if let Some(kind) = self.message_kind {
            dst.put_u8(kind.digit());
            if let Some(id) = self.correlation_id {
                dst.put_slice(id.to_string().as_bytes());
            }
        }
        dst.put_slice(&self.payload);
    }

    fn encoded_len(&self) -> usize {
        // header digits plus the worst-case identifier width
        2 + MAX_ID_DIGITS + self.payload.len()
    }
}

impl CorrelatableFrame for Frame {
    fn correlation_id(&self) -> Option<u64> { self.correlation_id }

    fn set_correlation_id(&mut self, correlation_id: Option<u64>) {
        self.correlation_id = correlation_id;
    }
}

/// Cursor over the frame header.
struct Lexer<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a [u8]) -> Self { Self { input, position: 0 } }

    fn peek(&self) -> Option<u8> { self.input.get(self.position).copied() }

    /// Consume a single ASCII digit if one is next.
    fn digit(&mut self) -> Option<u8> {
        let byte = self.peek().filter(u8::is_ascii_digit)?;
        self.position += 1;
        Some(byte)
    }

    /// Consume the longest run of ASCII digits.
    fn digits(&mut self) -> &'a [u8] {
        let start = self.position;
        while self.digit().is_some() {}
        &self.input[start..self.position]
    }

    const fn position(&self) -> usize { self.position }
}

fn parse_correlation_id(digits: &[u8]) -> Result<u64, FrameError> {
    digits
        .iter()
        .try_fold(0u64, |acc, digit| {
            acc.checked_mul(10)?.checked_add(u64::from(digit - b'0'))
        })
        .ok_or_else(|| FrameError::CorrelationIdOverflow {
            digits: String::from_utf8_lossy(digits).into_owned(),
        })
}
