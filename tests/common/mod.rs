//! Shared utilities for integration tests.
//!
//! Opens connections against the in-memory dialer with paused time, and
//! offers small helpers for the waits every test repeats.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::time::Duration;

use bytes::Bytes;
use rtwire::{Connection, ConnectionOptions, SendError};
use rtwire_testing::{MemoryDialer, MemoryServer, ServerEnd};
use serde_json::Value;
use tokio::task::JoinHandle;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub const URL: &str = "memory://realtime/socket.io/?EIO=3&transport=websocket";

/// A connection wired to an in-memory server.
pub struct Harness {
    pub connection: Connection,
    pub dialer: MemoryDialer,
    pub server: MemoryServer,
}

/// Open a connection with `options` against a fresh in-memory server.
pub fn open_with(options: ConnectionOptions) -> Harness {
    let (dialer, server) = MemoryDialer::with_server();
    let connection = Connection::open_with(URL, dialer.clone(), options);
    Harness {
        connection,
        dialer,
        server,
    }
}

/// Open a connection with default options.
pub fn open() -> Harness { open_with(ConnectionOptions::default()) }

impl Harness {
    /// Accept the next transport and consume its connect notification.
    pub async fn connected(&mut self) -> ServerEnd {
        let end = self.server.accept().await;
        assert_eq!(
            self.connection.connect_notifications().recv().await,
            Some(()),
            "expected a connect notification"
        );
        end
    }

    /// Issue `send` from a separate task so the test can play the server.
    pub fn spawn_send(&self, command: &'static str, payload: Value) -> JoinHandle<Result<Bytes, SendError>> {
        let handle = self.connection.handle();
        tokio::spawn(async move { handle.send(command, &payload).await })
    }
}

/// Wait until the client side of `end` is closed, skipping pings.
pub async fn assert_client_closed(end: &mut ServerEnd) {
    let next = tokio::time::timeout(Duration::from_secs(120), end.recv_non_ping()).await;
    assert_eq!(next, Ok(None), "client transport should be closed");
}
