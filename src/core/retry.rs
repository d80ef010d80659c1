//! Bounded retry with server-directed backoff override.

use std::time::Duration;

/// Retry budget and backoff schedule for rate-limited requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one (default: 3)
    pub max_attempts: u32,
    /// Delay before the first retry; doubled on each further attempt (default: 1s)
    pub base_delay: Duration,
    /// Cap on the exponential delay
    pub max_delay: Option<Duration>,
    /// Cap on a server-supplied `Retry-After` delay (default: 60s)
    pub max_retry_after: Option<Duration>,
    /// Apply +/- 10% jitter to the exponential delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: None,
            max_retry_after: Some(Duration::from_secs(60)),
            jitter: false,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// `None` honours any `Retry-After` the server sends.
    pub fn with_max_retry_after(mut self, max_retry_after: Option<Duration>) -> Self {
        self.max_retry_after = max_retry_after;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Attempts actually made; a zero budget still performs one request.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Whether another attempt may follow the zero-based `attempt`.
    pub fn has_retry_left(&self, attempt: u32) -> bool {
        attempt + 1 < self.attempts()
    }

    /// Delay to wait after the zero-based `attempt` was rate limited.
    ///
    /// A `Retry-After` value that parses as whole seconds wins over the
    /// exponential schedule, bounded by `max_retry_after`; anything else (HTTP
    /// dates included) is ignored.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<&str>) -> Duration {
        if let Some(seconds) = retry_after.and_then(parse_retry_after) {
            let delay = Duration::from_secs(seconds);
            return match self.max_retry_after {
                Some(max) => delay.min(max),
                None => delay,
            };
        }

        let factor = 2_f64.powi(attempt.min(31) as i32);
        let mut delay_ms = self.base_delay.as_millis() as f64 * factor;

        if self.jitter {
            let jitter_factor = rand::random::<f64>() * 0.2 + 0.9;
            delay_ms *= jitter_factor;
        }

        let delay = Duration::from_millis(delay_ms as u64);
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

fn parse_retry_after(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
