//! Reconnect delay tracking.

use std::time::Duration;

use crate::config::BackoffConfig;

/// Current reconnect delay, grown geometrically after each failed dial.
#[derive(Clone, Copy, Debug)]
pub(super) struct ReconnectBackoff {
    config: BackoffConfig,
    current: Duration,
}

impl ReconnectBackoff {
    /// `config` is expected to be normalized.
    pub(super) fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            current: config.initial_delay,
        }
    }

    pub(super) fn current(&self) -> Duration { self.current }

    /// Grow the delay: `min(max_delay, current * multiplier)`.
    pub(super) fn advance(&mut self) {
        let grown = Duration::try_from_secs_f64(self.current.as_secs_f64() * self.config.multiplier)
            .unwrap_or(self.config.max_delay);
        self.current = grown.min(self.config.max_delay);
    }

    pub(super) fn reset(&mut self) { self.current = self.config.initial_delay; }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(backoff: &mut ReconnectBackoff, steps: usize) -> Vec<Duration> {
        (0..steps)
            .map(|_| {
                let delay = backoff.current();
                backoff.advance();
                delay
            })
            .collect()
    }

    #[test]
    fn grows_by_half_and_caps_at_ceiling() {
        let mut backoff = ReconnectBackoff::new(BackoffConfig::default());
        let delays = sequence(&mut backoff, 13);
        let expected_ms = [
            1000, 1500, 2250, 3375, 5062, 7593, 11390, 17085, 25628, 38443, 57665, 60000, 60000,
        ];
        for (delay, expected) in delays.iter().zip(expected_ms) {
            assert_eq!(delay.as_millis(), expected, "delays were {delays:?}");
        }
    }

    #[test]
    fn reset_returns_to_floor() {
        let mut backoff = ReconnectBackoff::new(BackoffConfig::default());
        backoff.advance();
        backoff.advance();
        backoff.reset();
        assert_eq!(backoff.current(), Duration::from_secs(1));
    }

    #[test]
    fn huge_multiplier_saturates_at_ceiling() {
        let mut backoff = ReconnectBackoff::new(BackoffConfig {
            multiplier: f64::MAX,
            max_delay: Duration::MAX,
            ..BackoffConfig::default()
        });
        backoff.advance();
        assert_eq!(backoff.current(), Duration::MAX);
    }
}
