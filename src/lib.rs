#![doc(html_root_url = "https://docs.rs/rtwire/latest")]
//! Public API for the `rtwire` library.
//!
//! This crate provides an auto-reconnecting realtime protocol client:
//! a frame codec for the Engine.IO/Socket.IO text framing, a session loop
//! that owns one transport at a time, and a [`Connection`] facade exposing
//! connect notifications, pushed events and correlated request/reply.

pub mod config;
pub mod connection;
pub mod correlation;
pub mod frame;
pub mod message;
pub mod metrics;
pub mod session;
pub mod transport;

pub use config::{BackoffConfig, ConnectionOptions};
pub use connection::{Connection, ConnectionEvent, ConnectionHandle, SendError};
pub use correlation::CorrelatableFrame;
pub use frame::{Frame, FrameError};
pub use message::IncomingMessage;
pub use session::{SessionPhase, active_session_count};
pub use transport::{Dialer, Transport, TransportError, WebSocketDialer};
