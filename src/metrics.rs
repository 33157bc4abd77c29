//! Metric helpers for `rtwire`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. With the
//! `metrics` feature disabled every helper compiles to a no-op.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the gauge tracking live transport sessions.
pub const SESSIONS_ACTIVE: &str = "rtwire_sessions_active";
/// Name of the counter tracking frames written and read.
pub const FRAMES_PROCESSED: &str = "rtwire_frames_processed_total";
/// Name of the counter tracking failed dial attempts.
pub const DIAL_FAILURES: &str = "rtwire_dial_failures_total";
/// Name of the counter tracking frames discarded as malformed.
pub const FRAME_ERRORS: &str = "rtwire_frame_errors_total";
/// Name of the counter tracking sends that gave up waiting for a reply.
pub const REPLY_TIMEOUTS: &str = "rtwire_reply_timeouts_total";

/// Direction of frame processing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Frames read from the server.
    Inbound,
    /// Frames written to the server.
    Outbound,
}

impl Direction {
    /// Label value used for this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Increment the live sessions gauge.
pub fn inc_sessions() {
    #[cfg(feature = "metrics")]
    gauge!(SESSIONS_ACTIVE).increment(1.0);
}

/// Decrement the live sessions gauge.
pub fn dec_sessions() {
    #[cfg(feature = "metrics")]
    gauge!(SESSIONS_ACTIVE).decrement(1.0);
}

/// Record a processed frame for the given direction.
pub fn inc_frames(direction: Direction) {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_PROCESSED, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record a failed dial attempt.
pub fn inc_dial_failures() {
    #[cfg(feature = "metrics")]
    counter!(DIAL_FAILURES).increment(1);
}

/// Record a discarded malformed frame.
pub fn inc_frame_errors() {
    #[cfg(feature = "metrics")]
    counter!(FRAME_ERRORS).increment(1);
}

/// Record a send that timed out.
pub fn inc_reply_timeouts() {
    #[cfg(feature = "metrics")]
    counter!(REPLY_TIMEOUTS).increment(1);
}
