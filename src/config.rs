//! Tunable options for a [`Connection`](crate::Connection).

use std::time::Duration;

const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(20);
const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);
const MIN_DURATION: Duration = Duration::from_millis(1);

/// Configuration for the reconnect back-off.
///
/// After a failed dial the session loop waits the current delay, then grows
/// it by `multiplier`, capped at `max_delay`. A successful connect resets the
/// delay to `initial_delay`.
///
/// # Default Values
/// - `initial_delay`: 1 second
/// - `max_delay`: 60 seconds
/// - `multiplier`: 1.5
///
/// # Invariants
/// - `initial_delay` must not exceed `max_delay`
/// - both delays must be at least 1 millisecond
/// - `multiplier` must be finite and at least 1.0
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffConfig {
    /// Delay used for the first retry after a dial failure.
    pub initial_delay: Duration,
    /// Maximum delay once retries have grown.
    pub max_delay: Duration,
    /// Growth factor applied after every failed attempt.
    pub multiplier: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            multiplier: 1.5,
        }
    }
}

impl BackoffConfig {
    /// Clamp values to sane bounds and ensure `initial_delay <= max_delay`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use rtwire::BackoffConfig;
    ///
    /// let cfg = BackoffConfig {
    ///     initial_delay: Duration::from_millis(5),
    ///     max_delay: Duration::from_millis(1),
    ///     multiplier: 0.5,
    /// };
    ///
    /// let normalized = cfg.normalized();
    /// assert_eq!(normalized.initial_delay, Duration::from_millis(1));
    /// assert_eq!(normalized.max_delay, Duration::from_millis(5));
    /// assert!((normalized.multiplier - 1.0).abs() < f64::EPSILON);
    /// ```
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.initial_delay = self.initial_delay.max(MIN_DURATION);
        self.max_delay = self.max_delay.max(MIN_DURATION);
        if self.initial_delay > self.max_delay {
            std::mem::swap(&mut self.initial_delay, &mut self.max_delay);
        }
        self.multiplier = if self.multiplier.is_finite() {
            self.multiplier.max(1.0)
        } else {
            Self::default().multiplier
        };
        self
    }
}

/// Options controlling a connection's timers and logging.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use rtwire::ConnectionOptions;
///
/// let options = ConnectionOptions::default()
///     .reply_timeout(Duration::from_secs(2))
///     .label("feed");
/// assert_eq!(options.reply_timeout_value(), Duration::from_secs(2));
/// assert_eq!(options.label_value(), Some("feed"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionOptions {
    ping_interval: Duration,
    dial_timeout: Duration,
    reply_timeout: Duration,
    backoff: BackoffConfig,
    label: Option<String>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            ping_interval: DEFAULT_PING_INTERVAL,
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            backoff: BackoffConfig::default(),
            label: None,
        }
    }
}

impl ConnectionOptions {
    /// Ping cadence used until the server announces its own.
    #[must_use]
    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Upper bound on a single dial attempt.
    #[must_use]
    pub fn dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    /// Upper bound on a `send`, from enqueueing to the reply.
    #[must_use]
    pub fn reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Reconnect back-off settings.
    #[must_use]
    pub fn backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Label attached to every log record of the connection.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Return the default ping interval.
    #[must_use]
    pub const fn ping_interval_value(&self) -> Duration { self.ping_interval }

    /// Return the dial timeout.
    #[must_use]
    pub const fn dial_timeout_value(&self) -> Duration { self.dial_timeout }

    /// Return the reply timeout.
    #[must_use]
    pub const fn reply_timeout_value(&self) -> Duration { self.reply_timeout }

    /// Return the back-off settings.
    #[must_use]
    pub const fn backoff_value(&self) -> BackoffConfig { self.backoff }

    /// Return the log label, if one was set.
    #[must_use]
    pub fn label_value(&self) -> Option<&str> { self.label.as_deref() }

    /// Clamp every duration to at least 1 ms and normalize the back-off.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.ping_interval = self.ping_interval.max(MIN_DURATION);
        self.dial_timeout = self.dial_timeout.max(MIN_DURATION);
        self.reply_timeout = self.reply_timeout.max(MIN_DURATION);
        self.backoff = self.backoff.normalized();
        self
    }
}
