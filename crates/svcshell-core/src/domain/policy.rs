//! Bounded retry policy for startup polling.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::LaunchMode;

/// Fixed-interval, bounded-attempt polling policy.
///
/// There is no backoff: after the grace delay the endpoint is polled every
/// `poll_interval`, at most `max_attempts` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Timeout of the probe for a pre-existing instance.
    pub existing_probe_timeout: Duration,
    /// Timeout of each poll after launch.
    pub probe_timeout: Duration,
    /// Pause between two polls.
    pub poll_interval: Duration,
    /// Maximum number of polls after launch.
    pub max_attempts: u32,
    /// Wait after launch before the first poll, so the service can bind its port.
    pub grace_delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_EXISTING_PROBE_TIMEOUT: Duration = Duration::from_millis(1000);
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
    pub const IN_PROCESS_GRACE_DELAY: Duration = Duration::from_millis(2000);
    pub const SUBPROCESS_GRACE_DELAY: Duration = Duration::from_millis(3000);

    /// Defaults for the given launch mode (embedded services get a shorter grace delay).
    pub const fn for_mode(mode: LaunchMode) -> Self {
        let grace_delay = match mode {
            LaunchMode::InProcess => Self::IN_PROCESS_GRACE_DELAY,
            LaunchMode::Subprocess => Self::SUBPROCESS_GRACE_DELAY,
        };
        Self {
            existing_probe_timeout: Self::DEFAULT_EXISTING_PROBE_TIMEOUT,
            probe_timeout: Self::DEFAULT_PROBE_TIMEOUT,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            grace_delay,
        }
    }

    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub const fn with_grace_delay(mut self, delay: Duration) -> Self {
        self.grace_delay = delay;
        self
    }

    #[must_use]
    pub const fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Attempt ceiling, never below one.
    pub const fn attempts(&self) -> u32 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }

    /// Upper bound on the time spent in `PollingHealth`.
    pub fn worst_case_duration(&self) -> Duration {
        let attempts = self.attempts();
        self.grace_delay + self.probe_timeout * attempts + self.poll_interval * (attempts - 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::for_mode(LaunchMode::Subprocess)
    }
}
