//! In-memory host for tests and simulation.
//!
//! [`SimulatedHost`] records every call the loader makes so tests can assert
//! on exact side effects: which scripts were injected, how many slots were
//! defined, how often services were enabled.

use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

use super::{
    ContainerId, ContainerStyle, ExchangeService, Host, Page, PixelTracker, PrimaryNetwork,
    PrivacySettings, ProbeHandle, ProbeSpec, SenseQueue, SenseUnit, SlotHandle, SlotInfo,
};
use crate::config::{PrimaryRequest, PRIMARY_CONTAINER, SECONDARY_CONTAINER};
use crate::fallback::EXCHANGE_SCRIPT_URL;
use crate::viewport::AdSize;

/// Default simulated page origin.
pub const SIM_ORIGIN: &str = "https://news.example";

/// Default simulated viewport width (desktop).
pub const SIM_VIEWPORT_WIDTH: u32 = 1400;

// =============================================================================
// Page
// =============================================================================

/// State of one simulated container element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimContainer {
    /// Height of the nested creative frame, if one rendered.
    pub creative_height: Option<u32>,
    pub style: Option<ContainerStyle>,
    pub sense_units: Vec<SenseUnit>,
    pub times_cleared: u32,
}

/// A DOM mutation performed through [`Page`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMutation {
    ProbeInserted(ProbeHandle),
    ProbeRemoved(ProbeHandle),
    ContainerCleared(ContainerId),
    ContainerStyled(ContainerId),
    SenseUnitAppended(ContainerId),
    ScriptInjected(String),
}

/// Simulated document.
#[derive(Debug, Clone)]
pub struct SimPage {
    origin: String,
    viewport_width: u32,
    containers: BTreeMap<ContainerId, SimContainer>,
    can_run_ads: Option<bool>,
    blocks_ads: bool,
    probes: BTreeMap<ProbeHandle, ProbeSpec>,
    next_probe: u64,
    scripts: Vec<String>,
    mutations: Vec<PageMutation>,
}

impl Default for SimPage {
    fn default() -> Self {
        let containers = [PRIMARY_CONTAINER, SECONDARY_CONTAINER]
            .into_iter()
            .map(|id| (ContainerId::from(id), SimContainer::default()))
            .collect();

        Self {
            origin: SIM_ORIGIN.to_string(),
            viewport_width: SIM_VIEWPORT_WIDTH,
            containers,
            can_run_ads: None,
            blocks_ads: false,
            probes: BTreeMap::new(),
            next_probe: 0,
            scripts: Vec::new(),
            mutations: Vec::new(),
        }
    }
}

impl SimPage {
    pub fn set_viewport_width(&mut self, width: u32) {
        self.viewport_width = width;
    }

    pub fn add_container(&mut self, id: impl Into<ContainerId>) {
        self.containers.entry(id.into()).or_default();
    }

    pub fn remove_container(&mut self, id: &ContainerId) {
        self.containers.remove(id);
    }

    /// Pretend a creative frame of the given height rendered in the container.
    pub fn render_creative(&mut self, id: &ContainerId, height: u32) {
        if let Some(container) = self.containers.get_mut(id) {
            container.creative_height = Some(height);
        }
    }

    /// Make probe elements collapse, as a content blocker would.
    pub fn set_blocks_ads(&mut self, blocks: bool) {
        self.blocks_ads = blocks;
    }

    pub fn set_can_run_ads(&mut self, flag: Option<bool>) {
        self.can_run_ads = flag;
    }

    pub fn container(&self, id: &ContainerId) -> Option<&SimContainer> {
        self.containers.get(id)
    }

    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    pub fn mutations(&self) -> &[PageMutation] {
        &self.mutations
    }

    /// Probes inserted and not yet removed.
    pub fn live_probes(&self) -> usize {
        self.probes.len()
    }
}

impl Page for SimPage {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    fn has_element(&self, id: &ContainerId) -> bool {
        self.containers.contains_key(id)
    }

    fn creative_height(&self, id: &ContainerId) -> Option<u32> {
        self.containers.get(id).and_then(|c| c.creative_height)
    }

    fn can_run_ads(&self) -> Option<bool> {
        self.can_run_ads
    }

    fn insert_probe(&mut self, probe: &ProbeSpec) -> ProbeHandle {
        let handle = ProbeHandle(self.next_probe);
        self.next_probe += 1;
        self.probes.insert(handle, probe.clone());
        self.mutations.push(PageMutation::ProbeInserted(handle));
        handle
    }

    fn probe_height(&self, probe: ProbeHandle) -> u32 {
        match self.probes.get(&probe) {
            Some(_) if self.blocks_ads => 0,
            Some(spec) => spec.height_px,
            None => 0,
        }
    }

    fn remove_probe(&mut self, probe: ProbeHandle) {
        if self.probes.remove(&probe).is_some() {
            self.mutations.push(PageMutation::ProbeRemoved(probe));
        }
    }

    fn clear_container(&mut self, id: &ContainerId) {
        if let Some(container) = self.containers.get_mut(id) {
            container.creative_height = None;
            container.sense_units.clear();
            container.times_cleared += 1;
            self.mutations.push(PageMutation::ContainerCleared(id.clone()));
        }
    }

    fn style_container(&mut self, id: &ContainerId, style: &ContainerStyle) {
        if let Some(container) = self.containers.get_mut(id) {
            container.style = Some(style.clone());
            self.mutations.push(PageMutation::ContainerStyled(id.clone()));
        }
    }

    fn append_sense_unit(&mut self, id: &ContainerId, unit: &SenseUnit) {
        if let Some(container) = self.containers.get_mut(id) {
            container.sense_units.push(unit.clone());
            self.mutations.push(PageMutation::SenseUnitAppended(id.clone()));
        }
    }

    fn inject_script(&mut self, src: &str) {
        self.scripts.push(src.to_string());
        self.mutations
            .push(PageMutation::ScriptInjected(src.to_string()));
    }

    fn has_script(&self, src: &str) -> bool {
        self.scripts.iter().any(|s| s == src)
    }
}

// =============================================================================
// Primary network
// =============================================================================

/// Simulated primary entry point that becomes callable after a number of polls.
#[derive(Debug, Clone)]
pub struct SimPrimary {
    ready_after: Option<u32>,
    polls: Cell<u32>,
    calls: Vec<PrimaryRequest>,
}

impl SimPrimary {
    /// Callable once `polls` unsuccessful polls have happened.
    pub fn ready_after(polls: u32) -> Self {
        Self {
            ready_after: Some(polls),
            polls: Cell::new(0),
            calls: Vec::new(),
        }
    }

    /// Never becomes callable (vendor script blocked or failed).
    pub fn never_ready() -> Self {
        Self {
            ready_after: None,
            polls: Cell::new(0),
            calls: Vec::new(),
        }
    }

    pub fn polls(&self) -> u32 {
        self.polls.get()
    }

    pub fn calls(&self) -> &[PrimaryRequest] {
        &self.calls
    }
}

impl Default for SimPrimary {
    fn default() -> Self {
        Self::ready_after(0)
    }
}

impl PrimaryNetwork for SimPrimary {
    fn is_callable(&self) -> bool {
        let seen = self.polls.get();
        self.polls.set(seen + 1);
        self.ready_after.is_some_and(|n| seen >= n)
    }

    fn call(&mut self, request: &PrimaryRequest) {
        self.calls.push(request.clone());
    }
}

// =============================================================================
// Exchange
// =============================================================================

/// A call received by the simulated exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeCall {
    DefineSlot {
        ad_unit_path: String,
        sizes: Vec<AdSize>,
        container: ContainerId,
    },
    AddService(SlotHandle),
    SetTargeting {
        slot: SlotHandle,
        key: String,
        values: Vec<String>,
    },
    EnableSingleRequest,
    CollapseEmptyDivs,
    SetCentering(bool),
    SetPrivacySettings(PrivacySettings),
    EnableServices,
    Display(ContainerId),
    Refresh,
}

/// Simulated exchange publisher tag.
#[derive(Debug, Clone, Default)]
pub struct SimExchange {
    loaded: bool,
    never_loads: bool,
    failing: BTreeSet<ContainerId>,
    slots: Vec<SlotInfo>,
    next_handle: u64,
    calls: Vec<ExchangeCall>,
}

impl SimExchange {
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    /// Keep the SDK unavailable even after its script is injected.
    pub fn set_never_loads(&mut self, never: bool) {
        self.never_loads = never;
    }

    /// Make `define_slot` return `None` for the container.
    pub fn fail_slot(&mut self, container: impl Into<ContainerId>) {
        self.failing.insert(container.into());
    }

    /// Register a slot as if some other page script had defined it.
    pub fn add_foreign_slot(&mut self, ad_unit_path: &str, container: impl Into<ContainerId>) {
        let handle = self.allocate();
        self.slots.push(SlotInfo {
            handle,
            ad_unit_path: ad_unit_path.to_string(),
            container: container.into(),
            sizes: Vec::new(),
        });
    }

    pub fn calls(&self) -> &[ExchangeCall] {
        &self.calls
    }

    /// Number of recorded calls matching the predicate.
    pub fn count(&self, pred: impl Fn(&ExchangeCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn define_count(&self) -> usize {
        self.count(|c| matches!(c, ExchangeCall::DefineSlot { .. }))
    }

    pub fn enable_services_count(&self) -> usize {
        self.count(|c| matches!(c, ExchangeCall::EnableServices))
    }

    pub fn display_count(&self, container: &ContainerId) -> usize {
        self.count(|c| matches!(c, ExchangeCall::Display(id) if id == container))
    }

    fn allocate(&mut self) -> SlotHandle {
        self.next_handle += 1;
        SlotHandle(self.next_handle)
    }
}

impl ExchangeService for SimExchange {
    fn define_slot(
        &mut self,
        ad_unit_path: &str,
        sizes: &[AdSize],
        container: &ContainerId,
    ) -> Option<SlotHandle> {
        self.calls.push(ExchangeCall::DefineSlot {
            ad_unit_path: ad_unit_path.to_string(),
            sizes: sizes.to_vec(),
            container: container.clone(),
        });

        if self.failing.contains(container) {
            return None;
        }

        let handle = self.allocate();
        self.slots.push(SlotInfo {
            handle,
            ad_unit_path: ad_unit_path.to_string(),
            container: container.clone(),
            sizes: sizes.to_vec(),
        });
        Some(handle)
    }

    fn slots(&self) -> Vec<SlotInfo> {
        self.slots.clone()
    }

    fn add_service(&mut self, slot: SlotHandle) {
        self.calls.push(ExchangeCall::AddService(slot));
    }

    fn set_targeting(&mut self, slot: SlotHandle, key: &str, values: &[String]) {
        self.calls.push(ExchangeCall::SetTargeting {
            slot,
            key: key.to_string(),
            values: values.to_vec(),
        });
    }

    fn enable_single_request(&mut self) {
        self.calls.push(ExchangeCall::EnableSingleRequest);
    }

    fn collapse_empty_divs(&mut self) {
        self.calls.push(ExchangeCall::CollapseEmptyDivs);
    }

    fn set_centering(&mut self, centered: bool) {
        self.calls.push(ExchangeCall::SetCentering(centered));
    }

    fn set_privacy_settings(&mut self, settings: PrivacySettings) {
        self.calls.push(ExchangeCall::SetPrivacySettings(settings));
    }

    fn enable_services(&mut self) {
        self.calls.push(ExchangeCall::EnableServices);
    }

    fn display(&mut self, container: &ContainerId) {
        self.calls.push(ExchangeCall::Display(container.clone()));
    }

    fn refresh(&mut self) {
        self.calls.push(ExchangeCall::Refresh);
    }
}

// =============================================================================
// Sense queue and pixel
// =============================================================================

/// Simulated sense request queue.
#[derive(Debug, Clone, Default)]
pub struct SimSense {
    pushes: u32,
}

impl SimSense {
    pub fn pushes(&self) -> u32 {
        self.pushes
    }
}

impl SenseQueue for SimSense {
    fn push(&mut self) {
        self.pushes += 1;
    }
}

/// Simulated tracking pixel.
#[derive(Debug, Clone, Default)]
pub struct SimPixel {
    bootstrapped: bool,
    stub_installs: u32,
    inits: Vec<String>,
    events: Vec<String>,
}

impl SimPixel {
    /// A pixel some other page script already bootstrapped.
    pub fn preinstalled() -> Self {
        Self {
            bootstrapped: true,
            ..Self::default()
        }
    }

    pub fn stub_installs(&self) -> u32 {
        self.stub_installs
    }

    pub fn inits(&self) -> &[String] {
        &self.inits
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }
}

impl PixelTracker for SimPixel {
    fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    fn install_stub(&mut self) {
        self.bootstrapped = true;
        self.stub_installs += 1;
    }

    fn init(&mut self, pixel_id: &str) {
        self.inits.push(pixel_id.to_string());
    }

    fn track(&mut self, event: &str) {
        self.events.push(event.to_string());
    }
}

// =============================================================================
// Host bundle
// =============================================================================

/// A complete simulated host.
///
/// Defaults: desktop viewport, both related-search containers present, the
/// primary entry point callable on the first poll, nothing rendered, the
/// exchange SDK not loaded, no content blocker.
///
/// # Example
///
/// ```
/// use adfallback::host::sim::SimulatedHost;
///
/// let host = SimulatedHost::new()
///     .with_viewport_width(500)
///     .with_primary_ready_after(2)
///     .with_adblock();
/// assert_eq!(host.primary.polls(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulatedHost {
    pub page: SimPage,
    pub primary: SimPrimary,
    pub exchange: SimExchange,
    pub sense: SimSense,
    pub pixel: SimPixel,
}

impl SimulatedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport_width(mut self, width: u32) -> Self {
        self.page.set_viewport_width(width);
        self
    }

    pub fn with_primary_ready_after(mut self, polls: u32) -> Self {
        self.primary = SimPrimary::ready_after(polls);
        self
    }

    pub fn without_primary(mut self) -> Self {
        self.primary = SimPrimary::never_ready();
        self
    }

    /// The primary creative renders at the given height in the primary container.
    pub fn with_rendered_creative(mut self, height: u32) -> Self {
        self.page
            .render_creative(&ContainerId::from(PRIMARY_CONTAINER), height);
        self
    }

    pub fn with_adblock(mut self) -> Self {
        self.page.set_blocks_ads(true);
        self
    }

    pub fn with_can_run_ads(mut self, flag: bool) -> Self {
        self.page.set_can_run_ads(Some(flag));
        self
    }

    pub fn without_container(mut self, id: &str) -> Self {
        self.page.remove_container(&ContainerId::from(id));
        self
    }

    pub fn with_container(mut self, id: &str) -> Self {
        self.page.add_container(id);
        self
    }

    /// The exchange SDK is already on the page when the session starts.
    pub fn with_exchange_loaded(mut self) -> Self {
        self.exchange.set_loaded(true);
        self
    }

    pub fn with_exchange_never_loading(mut self) -> Self {
        self.exchange.set_never_loads(true);
        self
    }

    pub fn with_failing_slot(mut self, container: &str) -> Self {
        self.exchange.fail_slot(container);
        self
    }

    pub fn with_pixel_preinstalled(mut self) -> Self {
        self.pixel = SimPixel::preinstalled();
        self
    }

    /// Complete loads of injected vendor scripts.
    ///
    /// Returns `true` if the exchange SDK became available by this call, in
    /// which case the session's script-load callback should run.
    pub fn finish_script_loads(&mut self) -> bool {
        if self.exchange.is_loaded() || self.exchange.never_loads {
            return false;
        }
        if self.page.has_script(EXCHANGE_SCRIPT_URL) {
            self.exchange.set_loaded(true);
            return true;
        }
        false
    }
}

impl Host for SimulatedHost {
    fn page(&mut self) -> &mut dyn Page {
        &mut self.page
    }

    fn primary(&mut self) -> &mut dyn PrimaryNetwork {
        &mut self.primary
    }

    fn exchange(&mut self) -> Option<&mut dyn ExchangeService> {
        if self.exchange.is_loaded() {
            Some(&mut self.exchange)
        } else {
            None
        }
    }

    fn sense(&mut self) -> &mut dyn SenseQueue {
        &mut self.sense
    }

    fn pixel(&mut self) -> &mut dyn PixelTracker {
        &mut self.pixel
    }
}
