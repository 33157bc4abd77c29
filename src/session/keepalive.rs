//! Ping cadence timer.

use std::{pin::Pin, time::Duration};

use tokio::time::{Instant, Sleep, sleep};

/// Deadline for the next client ping.
#[derive(Debug)]
pub(super) struct Keepalive {
    interval: Duration,
    sleep: Pin<Box<Sleep>>,
}

impl Keepalive {
    pub(super) fn new(interval: Duration) -> Self {
        Self {
            interval,
            sleep: Box::pin(sleep(interval)),
        }
    }

    /// Resolve once the current deadline passes.
    pub(super) async fn tick(&mut self) { self.sleep.as_mut().await; }

    /// Push the deadline one interval past now.
    pub(super) fn reschedule(&mut self) {
        let deadline = Instant::now() + self.interval;
        self.sleep.as_mut().reset(deadline);
    }

    /// Switch to the server's cadence and reschedule the pending tick.
    pub(super) fn adopt(&mut self, interval: Duration) {
        self.interval = interval;
        self.reschedule();
    }

    pub(super) fn interval(&self) -> Duration { self.interval }
}

#[cfg(test)]
mod tests {
    use tokio::time::{self, timeout};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_after_interval() {
        let mut keepalive = Keepalive::new(Duration::from_secs(20));
        let start = Instant::now();
        keepalive.tick().await;
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn adopt_moves_pending_deadline() {
        let mut keepalive = Keepalive::new(Duration::from_secs(20));
        time::advance(Duration::from_secs(5)).await;
        keepalive.adopt(Duration::from_secs(25));
        assert_eq!(keepalive.interval(), Duration::from_secs(25));

        assert!(
            timeout(Duration::from_secs(24), keepalive.tick()).await.is_err(),
            "tick fired before the adopted interval"
        );
        keepalive.tick().await;
    }
}
