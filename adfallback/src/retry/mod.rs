//! Readiness retry scheduler for the primary network.
//!
//! The primary network's entry point is defined by a vendor script whose load
//! order relative to ours is not known. [`ReadinessRetry`] polls it, issues
//! the primary request exactly once when it becomes callable, and reports
//! exhaustion once the [`RetryPolicy`] budget is spent.
//!
//! # State Machine
//!
//! ```text
//! Polling --[callable]------------------------> Succeeded
//! Polling --[not callable, retries left]------> Polling (attempt_count += 1)
//! Polling --[not callable, budget spent]------> Exhausted
//! ```
//!
//! `Succeeded` and `Exhausted` are terminal. Further calls report the same
//! outcome and never touch the entry point again.

mod policy;

pub use policy::{RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY_MS};

use std::time::Duration;

use crate::config::PrimaryRequest;
use crate::host::PrimaryNetwork;

/// Result of a single load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The primary request was issued.
    Succeeded,
    /// The entry point is not callable yet; poll again after the delay.
    Retry(Duration),
    /// The retry budget is spent without the entry point becoming callable.
    Exhausted,
}

/// Lifecycle phase of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    Polling,
    Succeeded,
    Exhausted,
}

/// Polls the primary entry point with a bounded, fixed-delay retry budget.
#[derive(Debug, Clone)]
pub struct ReadinessRetry {
    policy: RetryPolicy,
    attempt_count: u32,
    phase: RetryPhase,
}

impl ReadinessRetry {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempt_count: 0,
            phase: RetryPhase::Polling,
        }
    }

    /// Number of retries scheduled so far.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn phase(&self) -> RetryPhase {
        self.phase
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Poll the entry point once.
    ///
    /// Issues `request` if the entry point is callable. Otherwise schedules
    /// another poll or reports exhaustion.
    pub fn attempt_load(
        &mut self,
        primary: &mut dyn PrimaryNetwork,
        request: &PrimaryRequest,
    ) -> LoadOutcome {
        match self.phase {
            RetryPhase::Succeeded => return LoadOutcome::Succeeded,
            RetryPhase::Exhausted => return LoadOutcome::Exhausted,
            RetryPhase::Polling => {}
        }

        if primary.is_callable() {
            primary.call(request);
            self.phase = RetryPhase::Succeeded;
            tracing::debug!(
                retries = self.attempt_count,
                "Primary entry point callable, request issued"
            );
            return LoadOutcome::Succeeded;
        }

        match self.policy.delay_for_retry(self.attempt_count + 1) {
            Some(delay) => {
                self.attempt_count += 1;
                tracing::debug!(
                    attempt = self.attempt_count,
                    delay_ms = delay.as_millis() as u64,
                    "Primary entry point not callable, retrying"
                );
                LoadOutcome::Retry(delay)
            }
            None => {
                self.phase = RetryPhase::Exhausted;
                tracing::debug!(
                    retries = self.attempt_count,
                    "Primary entry point never became callable"
                );
                LoadOutcome::Exhausted
            }
        }
    }
}

impl Default for ReadinessRetry {
    fn default() -> Self {
        Self::new(RetryPolicy::readiness())
    }
}
