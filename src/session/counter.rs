//! Live session counting and RAII guard.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global count of live transport sessions.
static ACTIVE_SESSIONS: AtomicU64 = AtomicU64::new(0);

/// RAII guard incrementing [`ACTIVE_SESSIONS`] on creation and
/// decrementing it on drop.
pub(super) struct LiveSession;

impl LiveSession {
    pub(super) fn new() -> Self {
        ACTIVE_SESSIONS.fetch_add(1, Ordering::Relaxed);
        crate::metrics::inc_sessions();
        Self
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        ACTIVE_SESSIONS.fetch_sub(1, Ordering::Relaxed);
        crate::metrics::dec_sessions();
    }
}

/// Return the number of transport sessions currently live in this process.
#[must_use]
pub fn active_session_count() -> u64 { ACTIVE_SESSIONS.load(Ordering::Relaxed) }
