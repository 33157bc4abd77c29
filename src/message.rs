//! Payload types carried inside frames.
//!
//! The client never interprets application payloads. [`IncomingMessage`]
//! only splits an event body into its type name and raw JSON payload, and
//! [`Handshake`] reads the session parameters the server announces in its
//! open packet.

use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::value::RawValue;

/// A server-pushed event, delivered to the consumer verbatim.
///
/// # Examples
///
/// ```
/// use rtwire::IncomingMessage;
///
/// let message = IncomingMessage::from_event_body(br#"["comment:new",{"id":1}]"#)
///     .expect("well-formed event");
/// assert_eq!(message.event_type(), "comment:new");
/// assert_eq!(message.payload().as_ref(), br#"{"id":1}"#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    event_type: String,
    payload: Bytes,
}

impl IncomingMessage {
    /// Build a message from its parts.
    #[must_use]
    pub fn new(event_type: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            event_type: event_type.into(),
            payload: payload.into(),
        }
    }

    /// Split an event body `[eventTypeName, eventPayload]`.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the body is not a two-element JSON
    /// array whose first element is a string.
    pub fn from_event_body(body: &[u8]) -> serde_json::Result<Self> {
        let (event_type, payload): (String, Box<RawValue>) = serde_json::from_slice(body)?;
        Ok(Self {
            event_type,
            payload: Bytes::copy_from_slice(payload.get().as_bytes()),
        })
    }

    /// Event type name, such as `event:new`.
    #[must_use]
    pub fn event_type(&self) -> &str { &self.event_type }

    /// Raw JSON payload of the event.
    #[must_use]
    pub const fn payload(&self) -> &Bytes { &self.payload }

    /// Deserialize the payload into an application type.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the payload does not match `T`.
    pub fn decode_payload<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.payload)
    }

    /// Consume the message, returning its type name and payload.
    #[must_use]
    pub fn into_parts(self) -> (String, Bytes) { (self.event_type, self.payload) }
}

/// Session parameters announced by the server's open packet.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Server-assigned session identifier.
    #[serde(default)]
    pub sid: Option<String>,
    /// Interval at which the server expects client pings, in milliseconds.
    pub ping_interval: u64,
    /// How long the server waits for a ping before dropping the session.
    #[serde(default)]
    pub ping_timeout: Option<u64>,
    /// Transport upgrades offered by the server.
    #[serde(default)]
    pub upgrades: Vec<String>,
}

impl Handshake {
    /// Parse the JSON payload of an open packet.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the payload is not an object with a
    /// numeric `pingInterval` field.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use rtwire::message::Handshake;
    ///
    /// let handshake = Handshake::from_json(br#"{"pingInterval":25000}"#).expect("valid handshake");
    /// assert_eq!(handshake.ping_interval(), Duration::from_secs(25));
    /// ```
    pub fn from_json(payload: &[u8]) -> serde_json::Result<Self> { serde_json::from_slice(payload) }

    /// The requested ping cadence.
    #[must_use]
    pub const fn ping_interval(&self) -> Duration { Duration::from_millis(self.ping_interval) }
}
