//! Transport error taxonomy.

use std::{error::Error as StdError, time::Duration};

use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Failures raised by a [`Dialer`](super::Dialer) or a live transport.
///
/// None of these reach callers of [`Connection`](crate::Connection): dial
/// failures trigger backoff and retry, read and write failures tear the
/// session down and reconnect.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport could not be established.
    #[error("dial failed: {0}")]
    Dial(#[source] BoxError),
    /// The dial did not complete within the configured timeout.
    #[error("dial timed out after {0:?}")]
    DialTimeout(Duration),
    /// Reading from the transport failed.
    #[error("read failed: {0}")]
    Read(#[source] BoxError),
    /// Writing to the transport failed.
    #[error("write failed: {0}")]
    Write(#[source] BoxError),
}

impl TransportError {
    /// Wrap a dial failure.
    pub fn dial(err: impl Into<BoxError>) -> Self { Self::Dial(err.into()) }

    /// Wrap a read failure.
    pub fn read(err: impl Into<BoxError>) -> Self { Self::Read(err.into()) }

    /// Wrap a write failure.
    pub fn write(err: impl Into<BoxError>) -> Self { Self::Write(err.into()) }
}
