//! Content-blocker heuristic.
//!
//! Blockers hide elements whose class names look like ad containers. A bait
//! element with such classes and a fixed 1px height is inserted, measured
//! and removed in one synchronous step; a collapsed height means something
//! is suppressing ads.
//!
//! The result only gates the fallback path. It never stops the primary
//! request.

use crate::host::{Page, ProbeSpec};

/// Class names a typical filter list hides.
pub const BAIT_CLASSES: &str = "adsbox ad-placement ad-container";

/// Inline height of the bait element.
pub const BAIT_HEIGHT_PX: u32 = 1;

/// Decides whether ad content is being suppressed on the page.
///
/// # Implementors
///
/// - `BaitProbe` - DOM bait element (production)
/// - `NeverBlocked` - Testing: reports no blocker
/// - `AlwaysBlocked` - Testing: reports a blocker
pub trait BlockDetector {
    fn is_blocked(&self, page: &mut dyn Page) -> bool;
}

/// Bait-element probe.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaitProbe;

impl BlockDetector for BaitProbe {
    fn is_blocked(&self, page: &mut dyn Page) -> bool {
        if page.can_run_ads() == Some(false) {
            tracing::debug!("Page reports canRunAds=false");
            return true;
        }

        let spec = ProbeSpec {
            class_name: BAIT_CLASSES.to_string(),
            height_px: BAIT_HEIGHT_PX,
        };
        let probe = page.insert_probe(&spec);
        let height = page.probe_height(probe);
        page.remove_probe(probe);

        let blocked = height == 0;
        tracing::debug!(height, blocked, "Adblock probe measured");
        blocked
    }
}

/// Testing detector that never reports a blocker.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverBlocked;

impl BlockDetector for NeverBlocked {
    fn is_blocked(&self, _page: &mut dyn Page) -> bool {
        false
    }
}

/// Testing detector that always reports a blocker.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysBlocked;

impl BlockDetector for AlwaysBlocked {
    fn is_blocked(&self, _page: &mut dyn Page) -> bool {
        true
    }
}
