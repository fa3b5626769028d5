//! Loader session.
//!
//! A [`Session`] owns everything that lives for the lifetime of a page: the
//! validated configuration, the readiness retry state, the slot registry and
//! the event loop that drives them. It is the only public entry point a page
//! integration needs: [`Session::start`], [`Session::refresh_fallback`] and
//! [`Session::debug_slots`].
//!
//! # Flow
//!
//! ```text
//! start ──> LoadPrimary ──[not callable]──> RetryPrimary (x5, 300ms apart)
//!               │                                  │
//!          [callable]                        [budget spent]
//!               │                                  │
//!               v                                  v
//!        CheckRender (+3000ms) ─────────────> attempt_fallback
//!                                                  │
//!                          decide: disabled / rendered / blocked / selected
//!                                                  │
//!                              exchange: queue slot   sense: push unit
//! ```
//!
//! Time only moves when the host calls [`Session::advance`],
//! [`Session::advance_to`] or [`Session::run_until_idle`]. When the exchange
//! script finishes loading, the host calls [`Session::on_exchange_ready`] to
//! drain queued slot commands.
//!
//! # Example
//!
//! ```
//! use adfallback::host::sim::SimulatedHost;
//! use adfallback::session::Session;
//!
//! let host = SimulatedHost::new().with_exchange_loaded();
//! let mut session = Session::new(host);
//! session.start_json(r#"{"p":"pub","s":"42","c":"news","at":"adx","fb":true,"sl":"/1/site/unit"}"#)?;
//! session.run_until_idle();
//!
//! // Nothing rendered in the simulated page, so the exchange slot was created.
//! assert_eq!(session.debug_slots().len(), 1);
//! # Ok::<(), adfallback::session::SessionError>(())
//! ```

mod error;
mod timeline;

pub use error::{Result, SessionError};
pub use timeline::{SessionEvent, TimelineEntry};

use std::time::Duration;

use crate::config::{AdType, LoaderConfig, LoaderTimings, PrimaryRequest, RawConfig, PRIMARY_CONTAINER};
use crate::event_loop::{EventLoop, Task};
use crate::fallback::{self, exchange, sense, FallbackAction, FallbackDecision};
use crate::host::{ContainerId, Host};
use crate::pixel::PixelInitializer;
use crate::probe::{check_rendered, BaitProbe, BlockDetector, NotRenderedReason, RenderHealth};
use crate::registry::{AdSlotRegistry, CommandOutcome, ExchangeCommand, SlotSummary};
use crate::retry::{LoadOutcome, ReadinessRetry};

/// State that exists only once a configuration was accepted.
struct Active {
    config: LoaderConfig,
    request: PrimaryRequest,
    retry: ReadinessRetry,
    last_decision: Option<FallbackDecision>,
}

/// One page's ad loading session.
pub struct Session<H: Host> {
    host: H,
    timings: LoaderTimings,
    events: EventLoop,
    registry: AdSlotRegistry,
    pixel: PixelInitializer,
    detector: Box<dyn BlockDetector>,
    active: Option<Active>,
    timeline: Vec<TimelineEntry>,
}

impl<H: Host> Session<H> {
    /// Create an idle session on a host, with default timings and the bait
    /// probe as block detector.
    pub fn new(host: H) -> Self {
        Self {
            host,
            timings: LoaderTimings::default(),
            events: EventLoop::new(),
            registry: AdSlotRegistry::new(),
            pixel: PixelInitializer::new(),
            detector: Box::new(BaitProbe),
            active: None,
            timeline: Vec::new(),
        }
    }

    pub fn with_timings(mut self, timings: LoaderTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_block_detector(mut self, detector: impl BlockDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    // =========================================================================
    // Public API
    // =========================================================================

    /// Validate the configuration and begin loading.
    ///
    /// An invalid configuration is rejected before anything touches the page.
    /// The primary load is scheduled at the current time; call one of the
    /// advance methods to run it.
    pub fn start(&mut self, raw: RawConfig) -> Result<()> {
        if self.active.is_some() {
            tracing::warn!("Ignoring second start on an active session");
            return Err(SessionError::AlreadyStarted);
        }

        let config = match LoaderConfig::try_from(raw) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected loader configuration");
                return Err(e.into());
            }
        };

        let origin = self.host.page().origin();
        let request = PrimaryRequest::new(&config, &origin);

        if config.ad_type() == AdType::Exchange && config.fallback_enabled() {
            exchange::ensure_script(&mut self.host);
        }

        if let Some(pixel_id) = config.pixel_id() {
            if self.pixel.run(&mut self.host, pixel_id) {
                self.record(SessionEvent::PixelInitialized);
            }
        }

        tracing::info!(
            publisher = config.publisher_id(),
            ad_type = %config.ad_type(),
            fallback = config.fallback_enabled(),
            "Loader session started"
        );
        self.record(SessionEvent::Started {
            ad_type: config.ad_type(),
            fallback_enabled: config.fallback_enabled(),
        });

        self.active = Some(Active {
            config,
            request,
            retry: ReadinessRetry::new(self.timings.retry.clone()),
            last_decision: None,
        });
        self.events.schedule(Duration::ZERO, Task::LoadPrimary);
        Ok(())
    }

    /// Parse a JSON configuration and [`start`](Self::start) with it.
    pub fn start_json(&mut self, json: &str) -> Result<()> {
        let raw = match RawConfig::from_json(json) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected loader configuration");
                return Err(SessionError::Config(e.into()));
            }
        };
        self.start(raw)
    }

    /// Refresh the creatives of registered exchange slots.
    ///
    /// Does nothing while the exchange SDK is unavailable. Returns `true` if
    /// a refresh command was issued.
    pub fn refresh_fallback(&mut self) -> bool {
        if self.host.exchange().is_none() {
            tracing::debug!("Exchange SDK not loaded, refresh skipped");
            return false;
        }
        self.record(SessionEvent::RefreshRequested);
        self.registry.enqueue(ExchangeCommand::Refresh);
        self.pump_exchange();
        true
    }

    /// Registered exchange slots, in registration order.
    pub fn debug_slots(&self) -> Vec<SlotSummary> {
        let slots = self.registry.debug_slots();
        tracing::info!(total = slots.len(), "Exchange slots");
        for (i, slot) in slots.iter().enumerate() {
            tracing::info!(
                index = i + 1,
                ad_unit = %slot.ad_unit_path,
                container = %slot.container,
                "Exchange slot"
            );
        }
        slots
    }

    /// Run one fallback attempt for the primary container.
    ///
    /// Safe to call any number of times: the registry guarantees the
    /// container never gets a second slot.
    pub fn attempt_fallback(&mut self, health: RenderHealth) -> FallbackAction {
        let Some(active) = self.active.as_ref() else {
            return FallbackAction::None;
        };

        let decision = fallback::decide(&active.config, health, || {
            self.detector.is_blocked(self.host.page())
        });
        tracing::debug!(health = %health, decision = %decision, "Fallback decided");
        self.record(SessionEvent::Decided(decision));
        if let Some(active) = self.active.as_mut() {
            active.last_decision = Some(decision);
        }

        if decision.action == FallbackAction::None {
            return FallbackAction::None;
        }

        let container = ContainerId::from(PRIMARY_CONTAINER);
        if !self.host.page().has_element(&container) {
            tracing::info!(container = %container, "Fallback container missing, nothing to fill");
            self.record(SessionEvent::ContainerMissing);
            return FallbackAction::None;
        }

        match decision.action {
            FallbackAction::LoadAdExchange => self.load_exchange(container),
            FallbackAction::LoadAdSense => self.load_sense(&container),
            FallbackAction::None => {}
        }
        decision.action
    }

    /// Exchange script finished loading: drain queued slot commands.
    pub fn on_exchange_ready(&mut self) -> Vec<CommandOutcome> {
        self.pump_exchange()
    }

    // =========================================================================
    // Clock
    // =========================================================================

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.events.now()
    }

    /// Deadline of the next scheduled task, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.events.next_deadline()
    }

    /// Run every task due within `delta` from now.
    pub fn advance(&mut self, delta: Duration) {
        let until = self.events.now() + delta;
        self.advance_to(until);
    }

    /// Run every task due at or before `at`, then move the clock to `at`.
    pub fn advance_to(&mut self, at: Duration) {
        while let Some(task) = self.events.pop_due(at) {
            self.run_task(task);
        }
        self.events.advance_to(at);
    }

    /// Run tasks until none are scheduled.
    pub fn run_until_idle(&mut self) {
        while let Some(deadline) = self.events.next_deadline() {
            self.advance_to(deadline);
        }
    }

    pub fn is_idle(&self) -> bool {
        self.events.is_idle()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn is_started(&self) -> bool {
        self.active.is_some()
    }

    pub fn config(&self) -> Option<&LoaderConfig> {
        self.active.as_ref().map(|a| &a.config)
    }

    pub fn retry(&self) -> Option<&ReadinessRetry> {
        self.active.as_ref().map(|a| &a.retry)
    }

    /// The most recent fallback decision.
    pub fn last_decision(&self) -> Option<FallbackDecision> {
        self.active.as_ref().and_then(|a| a.last_decision)
    }

    pub fn registry(&self) -> &AdSlotRegistry {
        &self.registry
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        &self.timeline
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn run_task(&mut self, task: Task) {
        match task {
            Task::LoadPrimary | Task::RetryPrimary => self.poll_primary(),
            Task::CheckRender => {
                let container = ContainerId::from(PRIMARY_CONTAINER);
                let health = check_rendered(self.host.page(), &container);
                tracing::debug!(container = %container, health = %health, "Render check");
                self.record(SessionEvent::RenderChecked(health));
                self.attempt_fallback(health);
            }
        }
    }

    fn poll_primary(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        let outcome = active.retry.attempt_load(self.host.primary(), &active.request);
        let retries = active.retry.attempt_count();

        match outcome {
            LoadOutcome::Succeeded => {
                self.record(SessionEvent::PrimaryRequested { retries });
                self.events.schedule(self.timings.render_grace, Task::CheckRender);
            }
            LoadOutcome::Retry(delay) => {
                self.record(SessionEvent::RetryScheduled {
                    attempt: retries,
                    delay,
                });
                self.events.schedule(delay, Task::RetryPrimary);
            }
            LoadOutcome::Exhausted => {
                tracing::info!(retries, "Primary network unavailable, trying fallback");
                self.record(SessionEvent::PrimaryExhausted { retries });
                self.attempt_fallback(RenderHealth::NotRendered(
                    NotRenderedReason::PrimaryUnavailable,
                ));
            }
        }
    }

    fn load_exchange(&mut self, container: ContainerId) {
        let Some(request) = self
            .active
            .as_ref()
            .and_then(|a| exchange::slot_request(&a.config, container.clone()))
        else {
            return;
        };

        // Slot creation failure is terminal: leave the container as it is.
        if self.registry.is_failed(&container) {
            tracing::debug!(container = %container, "Exchange slot failed earlier, container left untouched");
            self.record(SessionEvent::ContainerFailed);
            return;
        }

        // A container that already holds our slot keeps its creative.
        if self.registry.entry(&container).is_none() {
            self.host.page().clear_container(&container);
        }
        exchange::prepare_container(&mut self.host, &container);
        exchange::ensure_script(&mut self.host);

        self.registry.enqueue(ExchangeCommand::ShowSlot(request));
        self.record(SessionEvent::ExchangeQueued);
        self.pump_exchange();
    }

    fn load_sense(&mut self, container: &ContainerId) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if sense::load(&mut self.host, &active.config, container) {
            self.record(SessionEvent::SenseLoaded);
        }
    }

    /// Drain queued exchange commands if the SDK is available.
    fn pump_exchange(&mut self) -> Vec<CommandOutcome> {
        if self.registry.pending_commands() == 0 {
            return Vec::new();
        }

        let width = self.host.page().viewport_width();
        let Some(sdk) = self.host.exchange() else {
            tracing::debug!(
                pending = self.registry.pending_commands(),
                "Exchange SDK not loaded, commands queued"
            );
            return Vec::new();
        };

        let outcomes = self.registry.flush(sdk, width);
        for outcome in &outcomes {
            self.record(SessionEvent::Exchange(outcome.clone()));
        }
        outcomes
    }

    fn record(&mut self, event: SessionEvent) {
        self.timeline.push(TimelineEntry {
            at: self.events.now(),
            event,
        });
    }
}
