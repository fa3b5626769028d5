//! Fallback decision engine.
//!
//! Decides, after the primary network failed or rendered nothing, whether a
//! secondary network should be tried and which one. The rules apply in order:
//!
//! 1. fallback disabled by the publisher → nothing
//! 2. primary creative rendered → nothing
//! 3. content blocker detected → nothing (a fallback would be blocked too)
//! 4. otherwise the configured network
//!
//! The blocker probe touches the DOM, so it runs only when rules 1 and 2
//! pass. Deciding has no other side effects; loading happens in
//! [`exchange`] and [`sense`].

pub mod exchange;
pub mod sense;

pub use exchange::{slot_request, EXCHANGE_SCRIPT_URL, FALLBACK_MIN_HEIGHT_PX};
pub use sense::{sense_unit, SENSE_CLASS};

use std::fmt;

use crate::config::{AdType, LoaderConfig};
use crate::probe::RenderHealth;

/// What to do after a primary render failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackAction {
    None,
    LoadAdExchange,
    LoadAdSense,
}

/// Which rule produced the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    Disabled,
    Rendered,
    Blocked,
    Selected,
}

/// An action together with the rule that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackDecision {
    pub action: FallbackAction,
    pub reason: DecisionReason,
}

impl fmt::Display for FallbackDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            DecisionReason::Disabled => "fallback disabled",
            DecisionReason::Rendered => "primary rendered",
            DecisionReason::Blocked => "ads blocked",
            DecisionReason::Selected => "fallback selected",
        };
        write!(f, "{:?} ({})", self.action, reason)
    }
}

/// Apply the fallback rules.
///
/// `is_blocked` is evaluated at most once, and only when the first two rules
/// do not already settle the outcome.
pub fn decide(
    config: &LoaderConfig,
    health: RenderHealth,
    is_blocked: impl FnOnce() -> bool,
) -> FallbackDecision {
    let none = |reason| FallbackDecision {
        action: FallbackAction::None,
        reason,
    };

    if !config.fallback_enabled() {
        return none(DecisionReason::Disabled);
    }
    if health.is_rendered() {
        return none(DecisionReason::Rendered);
    }
    if is_blocked() {
        return none(DecisionReason::Blocked);
    }

    let action = match config.ad_type() {
        AdType::Exchange => FallbackAction::LoadAdExchange,
        AdType::Sense => FallbackAction::LoadAdSense,
    };
    FallbackDecision {
        action,
        reason: DecisionReason::Selected,
    }
}
