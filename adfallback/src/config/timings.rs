//! Session timing tunables.

use std::time::Duration;

use crate::retry::RetryPolicy;

/// Default wait between issuing the primary request and checking whether it
/// rendered (3 seconds).
pub const DEFAULT_RENDER_GRACE_MS: u64 = 3000;

/// Timers used by a loader session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderTimings {
    /// Polling policy for the primary entry point.
    pub retry: RetryPolicy,
    /// Delay before the render health check.
    pub render_grace: Duration,
}

impl Default for LoaderTimings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::readiness(),
            render_grace: Duration::from_millis(DEFAULT_RENDER_GRACE_MS),
        }
    }
}

impl LoaderTimings {
    /// Set the primary polling policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the render grace period.
    pub fn with_render_grace(mut self, grace: Duration) -> Self {
        self.render_grace = grace;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let timings = LoaderTimings::default();
        assert_eq!(timings.retry, RetryPolicy::readiness());
        assert_eq!(timings.render_grace, Duration::from_secs(3));
    }

    #[test]
    fn test_builder_overrides() {
        let timings = LoaderTimings::default()
            .with_retry(RetryPolicy::None)
            .with_render_grace(Duration::from_millis(10));
        assert_eq!(timings.retry, RetryPolicy::None);
        assert_eq!(timings.render_grace, Duration::from_millis(10));
    }
}
