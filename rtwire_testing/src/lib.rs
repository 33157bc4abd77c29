//! Utilities for driving an [`rtwire::Connection`] against an in-memory
//! server during tests.
//!
//! [`MemoryDialer`] stands in for the WebSocket dialer. Every accepted dial
//! hands a [`ServerEnd`] to the paired [`MemoryServer`], which the test uses
//! to script server frames, inspect client frames and inject failures.
//!
//! ```rust
//! use rtwire::{Connection, ConnectionOptions};
//! use rtwire_testing::MemoryDialer;
//!
//! # async fn example() {
//! let (dialer, mut server) = MemoryDialer::with_server();
//! let mut connection = Connection::open_with("memory://", dialer, ConnectionOptions::default());
//! let mut end = server.accept().await;
//! end.open(25_000);
//! assert!(connection.connect_notifications().recv().await.is_some());
//! # }
//! ```

pub mod logging;
pub mod memory;

pub use logging::{LoggerHandle, logger};
pub use memory::{MemoryDialer, MemoryServer, ServerEnd};
