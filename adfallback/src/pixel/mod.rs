//! Tracking pixel bootstrap.
//!
//! Runs once at session start when the configuration carries a pixel id. If
//! no other page script has bootstrapped the tracker yet, its script is
//! injected and a queueing stub installed so the `init`/`track` calls below
//! are buffered until the script arrives.

use crate::host::Host;

/// Pixel SDK script.
pub const PIXEL_SCRIPT_URL: &str = "https://connect.facebook.net/en_US/fbevents.js";

/// Event tracked once per page.
pub const PAGE_VIEW_EVENT: &str = "PageView";

/// One-shot pixel initializer.
#[derive(Debug, Default)]
pub struct PixelInitializer {
    done: bool,
}

impl PixelInitializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pixel has been initialized by this initializer.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Bootstrap the tracker if needed, then `init` and track a page view.
    ///
    /// Does nothing on later calls. Returns `true` if this call initialized
    /// the pixel.
    pub fn run(&mut self, host: &mut dyn Host, pixel_id: &str) -> bool {
        if self.done {
            return false;
        }
        self.done = true;

        if !host.pixel().is_bootstrapped() {
            host.page().inject_script(PIXEL_SCRIPT_URL);
            host.pixel().install_stub();
            tracing::debug!("Pixel script requested");
        }

        let pixel = host.pixel();
        pixel.init(pixel_id);
        pixel.track(PAGE_VIEW_EVENT);
        tracing::debug!(pixel_id, "Pixel initialized");
        true
    }
}
