//! Retry policy for polling an external entry point.
//!
//! The loader waits for the primary network's entry point with a fixed delay
//! between polls. Delays never grow.
//!
//! # Example
//!
//! ```
//! use adfallback::retry::RetryPolicy;
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::readiness();
//! assert_eq!(policy.max_retries(), 5);
//! assert_eq!(policy.delay_for_retry(1), Some(Duration::from_millis(300)));
//! assert_eq!(policy.delay_for_retry(6), None);
//! ```

use std::time::Duration;

// =============================================================================
// Retry Policy Constants
// =============================================================================

/// Default number of retries after the initial poll.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default delay between polls (300ms).
pub const DEFAULT_RETRY_DELAY_MS: u64 = 300;

/// How a poll handles an entry point that is not yet available.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// No retries - give up after the first unsuccessful poll.
    #[default]
    None,

    /// Fixed number of retries with constant delay between polls.
    Fixed {
        /// Maximum number of retries (not counting the initial poll).
        max_retries: u32,
        /// Delay before each retry.
        delay: Duration,
    },
}

impl RetryPolicy {
    /// Creates a fixed retry policy.
    ///
    /// # Arguments
    ///
    /// * `max_retries` - Maximum number of retries after the initial poll
    /// * `delay` - Fixed delay before each retry
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self::Fixed { max_retries, delay }
    }

    /// The policy used while waiting for the primary network: five retries,
    /// 300ms apart.
    pub fn readiness() -> Self {
        Self::fixed(
            DEFAULT_MAX_RETRIES,
            Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        )
    }

    /// Calculates the delay before a given retry.
    ///
    /// # Arguments
    ///
    /// * `retry` - The retry number (1-based, where 1 is the first retry)
    ///
    /// # Returns
    ///
    /// The delay to wait, or `None` if the retry budget is spent.
    pub fn delay_for_retry(&self, retry: u32) -> Option<Duration> {
        match self {
            Self::None => None,
            Self::Fixed { max_retries, delay } => {
                if retry >= 1 && retry <= *max_retries {
                    Some(*delay)
                } else {
                    None
                }
            }
        }
    }

    /// Returns the maximum number of retries for this policy.
    pub fn max_retries(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Fixed { max_retries, .. } => *max_retries,
        }
    }

    /// Total number of polls this policy allows, including the initial one.
    pub fn max_polls(&self) -> u32 {
        self.max_retries() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default() {
        assert_eq!(RetryPolicy::default(), RetryPolicy::None);
    }

    #[test]
    fn test_retry_policy_none() {
        let policy = RetryPolicy::None;
        assert_eq!(policy.max_retries(), 0);
        assert_eq!(policy.max_polls(), 1);
        assert_eq!(policy.delay_for_retry(1), None);
    }

    #[test]
    fn test_retry_policy_fixed() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(100));
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.delay_for_retry(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_for_retry(3), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_for_retry(4), None); // Budget spent
    }

    #[test]
    fn test_retry_zero_is_not_a_retry() {
        let policy = RetryPolicy::fixed(3, Duration::from_millis(100));
        assert_eq!(policy.delay_for_retry(0), None);
    }

    #[test]
    fn test_readiness_policy_delay_is_constant() {
        let policy = RetryPolicy::readiness();
        let delays: Vec<_> = (1..=5).filter_map(|n| policy.delay_for_retry(n)).collect();
        assert_eq!(delays, vec![Duration::from_millis(DEFAULT_RETRY_DELAY_MS); 5]);
        assert_eq!(policy.max_polls(), 6);
    }
}
