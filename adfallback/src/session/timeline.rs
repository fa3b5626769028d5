//! Record of what a session did and when.

use std::fmt;
use std::time::Duration;

use crate::config::AdType;
use crate::fallback::FallbackDecision;
use crate::probe::RenderHealth;
use crate::registry::CommandOutcome;

/// A notable step of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Started { ad_type: AdType, fallback_enabled: bool },
    PixelInitialized,
    PrimaryRequested { retries: u32 },
    RetryScheduled { attempt: u32, delay: Duration },
    PrimaryExhausted { retries: u32 },
    RenderChecked(RenderHealth),
    Decided(FallbackDecision),
    ContainerMissing,
    ContainerFailed,
    ExchangeQueued,
    Exchange(CommandOutcome),
    SenseLoaded,
    RefreshRequested,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Started {
                ad_type,
                fallback_enabled,
            } => write!(f, "started (fallback {}, enabled={})", ad_type, fallback_enabled),
            SessionEvent::PixelInitialized => f.write_str("pixel initialized"),
            SessionEvent::PrimaryRequested { retries } => {
                write!(f, "primary request issued after {} retries", retries)
            }
            SessionEvent::RetryScheduled { attempt, delay } => {
                write!(f, "primary not callable, retry {} in {}ms", attempt, delay.as_millis())
            }
            SessionEvent::PrimaryExhausted { retries } => {
                write!(f, "primary never callable after {} retries", retries)
            }
            SessionEvent::RenderChecked(health) => write!(f, "render check: {}", health),
            SessionEvent::Decided(decision) => write!(f, "decision: {}", decision),
            SessionEvent::ContainerMissing => f.write_str("primary container missing, nothing to fill"),
            SessionEvent::ContainerFailed => f.write_str("exchange slot failed earlier, container left untouched"),
            SessionEvent::ExchangeQueued => f.write_str("exchange command queued"),
            SessionEvent::Exchange(outcome) => write!(f, "exchange: {:?}", outcome),
            SessionEvent::SenseLoaded => f.write_str("sense unit pushed"),
            SessionEvent::RefreshRequested => f.write_str("refresh requested"),
        }
    }
}

/// An event stamped with the virtual time it happened at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub at: Duration,
    pub event: SessionEvent,
}

impl fmt::Display for TimelineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>6}ms] {}", self.at.as_millis(), self.event)
    }
}
