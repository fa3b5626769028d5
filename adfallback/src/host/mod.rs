//! Capabilities the loader needs from the host page and vendor SDKs.
//!
//! Everything outside the loader (the DOM, the primary network's entry point,
//! the exchange publisher tag, the sense queue and the tracking pixel) is
//! reached through the traits in this module. The loader never assumes any
//! of them exists before it asks.
//!
//! Each trait exposes only the calls the loader makes.
//!
//! # Implementors
//!
//! - [`sim::SimulatedHost`] - in-memory host used by tests and the CLI

pub mod sim;

use std::fmt;

use crate::config::PrimaryRequest;
use crate::viewport::AdSize;

/// Stable identity of a page element that hosts an ad.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Opaque handle to a slot object owned by the exchange SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotHandle(pub u64);

/// A slot as reported by the exchange SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    pub handle: SlotHandle,
    pub ad_unit_path: String,
    pub container: ContainerId,
    pub sizes: Vec<AdSize>,
}

/// Privacy flags applied once with the global service settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrivacySettings {
    pub restrict_data_processing: bool,
}

/// Inline style applied to a container before an exchange slot fills it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStyle {
    pub min_height_px: u32,
    pub text_align: String,
}

/// Marked element that the sense SDK turns into an ad unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenseUnit {
    pub class_name: String,
    pub display: String,
    pub client: String,
    pub slot: String,
    pub format: String,
    pub full_width_responsive: bool,
}

impl SenseUnit {
    /// Vendor attributes in the order they are set on the element.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("data-ad-client", self.client.clone()),
            ("data-ad-slot", self.slot.clone()),
            ("data-ad-format", self.format.clone()),
            (
                "data-full-width-responsive",
                self.full_width_responsive.to_string(),
            ),
        ]
    }
}

/// Element inserted to detect content blockers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSpec {
    pub class_name: String,
    pub height_px: u32,
}

/// Handle to an inserted probe element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProbeHandle(pub u64);

/// The host document.
pub trait Page {
    /// Origin of the current page, e.g. `https://news.example`.
    fn origin(&self) -> String;

    /// Current viewport width in CSS pixels.
    fn viewport_width(&self) -> u32;

    fn has_element(&self, id: &ContainerId) -> bool;

    /// Rendered height of the first creative frame nested in the container.
    ///
    /// `None` if the container or the frame does not exist.
    fn creative_height(&self, id: &ContainerId) -> Option<u32>;

    /// Page-level `canRunAds` flag, when a page script has set it.
    fn can_run_ads(&self) -> Option<bool>;

    fn insert_probe(&mut self, probe: &ProbeSpec) -> ProbeHandle;

    /// Synchronously measured height of an inserted probe.
    fn probe_height(&self, probe: ProbeHandle) -> u32;

    fn remove_probe(&mut self, probe: ProbeHandle);

    /// Remove all children of the container.
    fn clear_container(&mut self, id: &ContainerId);

    fn style_container(&mut self, id: &ContainerId, style: &ContainerStyle);

    fn append_sense_unit(&mut self, id: &ContainerId, unit: &SenseUnit);

    /// Append an async script element to the document head.
    fn inject_script(&mut self, src: &str);

    fn has_script(&self, src: &str) -> bool;
}

/// The primary network's entry point.
pub trait PrimaryNetwork {
    /// Whether the entry point is defined and callable right now.
    fn is_callable(&self) -> bool;

    /// Invoke the entry point with `(mode, options, block1, block2)`.
    fn call(&mut self, request: &PrimaryRequest);
}

/// The exchange publisher tag, once its script has loaded.
///
/// Collapses the tag's namespace and its `pubads()` service object into one
/// interface.
pub trait ExchangeService {
    /// Define a slot. Returns `None` when the SDK refuses the definition.
    fn define_slot(
        &mut self,
        ad_unit_path: &str,
        sizes: &[AdSize],
        container: &ContainerId,
    ) -> Option<SlotHandle>;

    /// All slots the SDK currently knows about.
    fn slots(&self) -> Vec<SlotInfo>;

    /// Attach a slot to the shared ads service.
    fn add_service(&mut self, slot: SlotHandle);

    fn set_targeting(&mut self, slot: SlotHandle, key: &str, values: &[String]);

    fn enable_single_request(&mut self);

    fn collapse_empty_divs(&mut self);

    fn set_centering(&mut self, centered: bool);

    fn set_privacy_settings(&mut self, settings: PrivacySettings);

    fn enable_services(&mut self);

    fn display(&mut self, container: &ContainerId);

    /// Request fresh creatives for every slot on the service.
    fn refresh(&mut self);
}

/// The sense SDK's global request queue.
pub trait SenseQueue {
    /// Push one empty request; the SDK fills the newest unfilled unit.
    fn push(&mut self);
}

/// The tracking pixel SDK.
pub trait PixelTracker {
    /// Whether the pixel's global function is already installed.
    fn is_bootstrapped(&self) -> bool;

    /// Install the queueing stub that buffers calls until the script loads.
    fn install_stub(&mut self);

    fn init(&mut self, pixel_id: &str);

    fn track(&mut self, event: &str);
}

/// Everything the loader talks to, bundled.
pub trait Host {
    fn page(&mut self) -> &mut dyn Page;

    fn primary(&mut self) -> &mut dyn PrimaryNetwork;

    /// The exchange service, or `None` while its script has not loaded.
    fn exchange(&mut self) -> Option<&mut dyn ExchangeService>;

    fn sense(&mut self) -> &mut dyn SenseQueue;

    fn pixel(&mut self) -> &mut dyn PixelTracker;
}
