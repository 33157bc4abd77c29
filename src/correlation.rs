//! Correlation identifiers linking outgoing commands to their replies.
//!
//! `CorrelatableFrame` abstracts over frame types that carry an optional
//! correlation identifier, so the session loop can stamp and inspect
//! identifiers without knowing the wire layout. [`CorrelationIds`] allocates
//! the identifiers for one transport session.

/// Largest identifier handed out before the counter wraps back to 1.
pub const MAX_CORRELATION_ID: u64 = 10_000;

/// Access and mutate correlation identifiers on frames.
pub trait CorrelatableFrame {
    /// Return the correlation identifier associated with this frame, if any.
    fn correlation_id(&self) -> Option<u64>;

    /// Set or clear the correlation identifier.
    fn set_correlation_id(&mut self, correlation_id: Option<u64>);
}

/// Sequential identifier allocator confined to `1..=MAX_CORRELATION_ID`.
///
/// Zero is never issued. A fresh allocator is created for every transport
/// session, so the first command after a (re)connect always carries id 1.
///
/// # Examples
///
/// ```
/// use rtwire::correlation::{CorrelationIds, MAX_CORRELATION_ID};
///
/// let mut ids = CorrelationIds::starting_at(MAX_CORRELATION_ID);
/// assert_eq!(ids.next_id(), MAX_CORRELATION_ID);
/// assert_eq!(ids.next_id(), 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CorrelationIds {
    next: u64,
}

impl Default for CorrelationIds {
    fn default() -> Self { Self { next: 1 } }
}

impl CorrelationIds {
    /// Create an allocator whose next identifier is `next`.
    ///
    /// Values outside the valid range restart the sequence at 1.
    #[must_use]
    pub fn starting_at(next: u64) -> Self {
        if (1..=MAX_CORRELATION_ID).contains(&next) {
            Self { next }
        } else {
            Self::default()
        }
    }

    /// Return the next identifier and advance the counter.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next = if id >= MAX_CORRELATION_ID { 1 } else { id + 1 };
        id
    }
}
