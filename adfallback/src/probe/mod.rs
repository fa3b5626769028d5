//! Synchronous page probes.
//!
//! Two read-mostly checks feed the fallback decision:
//!
//! - [`check_rendered`]: did the primary network put a visible creative in
//!   its container?
//! - [`BlockDetector`]: is a content blocker hiding ad-like elements?

mod adblock;
mod health;

pub use adblock::{
    AlwaysBlocked, BaitProbe, BlockDetector, NeverBlocked, BAIT_CLASSES, BAIT_HEIGHT_PX,
};
pub use health::{check_rendered, NotRenderedReason, RenderHealth};
