//! Viewport-based ad size negotiation.
//!
//! Maps the current viewport width onto one of three fixed buckets, each with
//! an ordered list of creative sizes offered to the exchange when a fallback
//! slot is defined.
//!
//! # Buckets
//!
//! ```text
//! width <  768            → Mobile   (320x50, 320x100, 300x250)
//! 768  <= width < 1024    → Tablet   (728x90, 468x60, 300x250, 336x280)
//! width >= 1024           → Desktop  (970x90, 970x250, 728x90, 300x250, 336x280, 160x600)
//! ```
//!
//! Sizes are recomputed on every call. The viewport may be resized between
//! two fallback attempts, so nothing here is cached.

use std::fmt;

/// Smallest width that belongs to the tablet bucket.
pub const TABLET_MIN_WIDTH: u32 = 768;

/// Smallest width that belongs to the desktop bucket.
pub const DESKTOP_MIN_WIDTH: u32 = 1024;

/// A creative size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AdSize {
    pub width: u32,
    pub height: u32,
}

impl AdSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for AdSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Mobile banners plus a medium rectangle.
pub const MOBILE_SIZES: &[AdSize] = &[
    AdSize::new(320, 50),
    AdSize::new(320, 100),
    AdSize::new(300, 250),
];

/// Leaderboard, banner and two box sizes.
pub const TABLET_SIZES: &[AdSize] = &[
    AdSize::new(728, 90),
    AdSize::new(468, 60),
    AdSize::new(300, 250),
    AdSize::new(336, 280),
];

/// Large leaderboards, boxes and the half-page skyscraper.
pub const DESKTOP_SIZES: &[AdSize] = &[
    AdSize::new(970, 90),
    AdSize::new(970, 250),
    AdSize::new(728, 90),
    AdSize::new(300, 250),
    AdSize::new(336, 280),
    AdSize::new(160, 600),
];

/// Viewport width class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportBucket {
    Mobile,
    Tablet,
    Desktop,
}

impl ViewportBucket {
    /// Classify a viewport width. Boundary values belong to the upper bucket.
    pub fn for_width(width: u32) -> Self {
        if width < TABLET_MIN_WIDTH {
            ViewportBucket::Mobile
        } else if width < DESKTOP_MIN_WIDTH {
            ViewportBucket::Tablet
        } else {
            ViewportBucket::Desktop
        }
    }

    /// Candidate sizes for this bucket, in preference order.
    pub fn sizes(&self) -> &'static [AdSize] {
        match self {
            ViewportBucket::Mobile => MOBILE_SIZES,
            ViewportBucket::Tablet => TABLET_SIZES,
            ViewportBucket::Desktop => DESKTOP_SIZES,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewportBucket::Mobile => "mobile",
            ViewportBucket::Tablet => "tablet",
            ViewportBucket::Desktop => "desktop",
        }
    }
}

impl fmt::Display for ViewportBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sizes to request for a viewport of the given width.
pub fn sizes_for_width(width: u32) -> Vec<AdSize> {
    ViewportBucket::for_width(width).sizes().to_vec()
}
