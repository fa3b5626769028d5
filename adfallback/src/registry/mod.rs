//! Ad slot registry for the exchange fallback.
//!
//! Owns every interaction with the exchange SDK and guarantees two
//! invariants that are easy to break against a global, script-loaded SDK:
//!
//! - **One slot per container.** A container gets at most one slot handle
//!   for the lifetime of the page. Later attempts only re-display it.
//! - **One service enablement.** The global service settings and the final
//!   `enable_services` call run exactly once per page, inside the same
//!   command as the first slot definition or adoption and before its
//!   display call.
//!
//! # State Machine
//!
//! ```text
//! per container:   absent --[define ok]--> registered --[display]--> displayed
//!                  displayed --[show again]--> displayed (display only)
//!                  absent --[define returns None]--> failed (terminal)
//!
//! per registry:    Uninitialized --[first define]--> Enabled (never back)
//! ```
//!
//! Commands are queued and only run once the SDK is available, mirroring the
//! SDK's own command queue. The queue is created lazily on first use.

mod command;
mod error;

pub use command::{CommandQueue, ExchangeCommand, SlotRequest, Targeting};
pub use error::RegistryError;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::host::{ContainerId, ExchangeService, PrivacySettings, SlotHandle};
use crate::viewport::{sizes_for_width, AdSize};

/// Lifecycle of a registered container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Slot defined and attached to the service, not yet displayed.
    Registered,
    /// Display has been issued at least once.
    Displayed,
}

/// Whether the one-time global service setup has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServicesState {
    #[default]
    Uninitialized,
    Enabled,
}

/// A container's slot as tracked by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotEntry {
    pub handle: SlotHandle,
    pub ad_unit_path: String,
    pub sizes: Vec<AdSize>,
    pub state: SlotState,
    pub display_count: u32,
    order: u64,
}

/// Read-only view of a registered slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSummary {
    pub ad_unit_path: String,
    pub container: ContainerId,
    pub sizes: Vec<AdSize>,
}

impl fmt::Display for SlotSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes: Vec<String> = self.sizes.iter().map(|s| s.to_string()).collect();
        write!(
            f,
            "{} in #{} [{}]",
            self.ad_unit_path,
            self.container,
            sizes.join(", ")
        )
    }
}

/// What executing one queued command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A new slot was defined, configured and displayed.
    Created(ContainerId),
    /// The container already had a slot; it was displayed again.
    Redisplayed(ContainerId),
    /// A slot defined by other page code was found and taken over.
    Adopted(ContainerId),
    /// A refresh was issued for this many registered slots.
    Refreshed(usize),
    /// The command failed; see the error.
    Failed(RegistryError),
}

/// Privacy settings applied with the global service setup.
pub const DEFAULT_PRIVACY: PrivacySettings = PrivacySettings {
    restrict_data_processing: false,
};

/// Registry of exchange slots keyed by container identity.
#[derive(Debug, Default)]
pub struct AdSlotRegistry {
    entries: BTreeMap<ContainerId, SlotEntry>,
    failed: BTreeSet<ContainerId>,
    services: ServicesState,
    cmd: Option<CommandQueue>,
    next_order: u64,
}

impl AdSlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command, creating the command queue if this is the first one.
    pub fn enqueue(&mut self, command: ExchangeCommand) {
        self.cmd.get_or_insert_with(CommandQueue::new).push(command);
    }

    /// Commands waiting for the SDK. `None` until something was queued.
    pub fn command_queue(&self) -> Option<&CommandQueue> {
        self.cmd.as_ref()
    }

    pub fn pending_commands(&self) -> usize {
        self.cmd.as_ref().map_or(0, CommandQueue::len)
    }

    /// Run every queued command against the available SDK, in order.
    ///
    /// `viewport_width` selects slot sizes for definitions made now.
    pub fn flush(
        &mut self,
        exchange: &mut dyn ExchangeService,
        viewport_width: u32,
    ) -> Vec<CommandOutcome> {
        let mut outcomes = Vec::new();
        while let Some(command) = self.cmd.as_mut().and_then(CommandQueue::pop) {
            outcomes.push(self.execute(command, exchange, viewport_width));
        }
        outcomes
    }

    /// Execute a single command immediately.
    pub fn execute(
        &mut self,
        command: ExchangeCommand,
        exchange: &mut dyn ExchangeService,
        viewport_width: u32,
    ) -> CommandOutcome {
        match command {
            ExchangeCommand::ShowSlot(request) => {
                match self.show_slot(request, exchange, viewport_width) {
                    Ok(outcome) => outcome,
                    Err(e) => CommandOutcome::Failed(e),
                }
            }
            ExchangeCommand::Refresh => {
                let registered = self.entries.len();
                if registered > 0 {
                    exchange.refresh();
                    tracing::debug!(slots = registered, "Exchange slots refreshed");
                }
                CommandOutcome::Refreshed(registered)
            }
        }
    }

    fn show_slot(
        &mut self,
        request: SlotRequest,
        exchange: &mut dyn ExchangeService,
        viewport_width: u32,
    ) -> Result<CommandOutcome, RegistryError> {
        let container = request.container;

        if self.failed.contains(&container) {
            return Err(RegistryError::ContainerFailed(container));
        }

        if let Some(entry) = self.entries.get_mut(&container) {
            exchange.display(&container);
            entry.state = SlotState::Displayed;
            entry.display_count += 1;
            tracing::debug!(container = %container, "Reusing existing exchange slot");
            return Ok(CommandOutcome::Redisplayed(container));
        }

        if let Some(existing) = exchange
            .slots()
            .into_iter()
            .find(|slot| slot.container == container)
        {
            self.ensure_services_enabled(exchange);
            exchange.display(&container);
            let order = self.take_order();
            self.entries.insert(
                container.clone(),
                SlotEntry {
                    handle: existing.handle,
                    ad_unit_path: existing.ad_unit_path,
                    sizes: existing.sizes,
                    state: SlotState::Displayed,
                    display_count: 1,
                    order,
                },
            );
            tracing::debug!(container = %container, "Adopted slot defined elsewhere on the page");
            return Ok(CommandOutcome::Adopted(container));
        }

        let sizes = sizes_for_width(viewport_width);
        let Some(handle) = exchange.define_slot(&request.ad_unit_path, &sizes, &container) else {
            tracing::error!(
                container = %container,
                ad_unit = %request.ad_unit_path,
                "Failed to define exchange slot"
            );
            self.failed.insert(container.clone());
            return Err(RegistryError::SlotCreationFailed {
                container,
                ad_unit_path: request.ad_unit_path,
            });
        };

        exchange.add_service(handle);
        for (key, values) in &request.targeting {
            exchange.set_targeting(handle, key, values);
        }

        let order = self.take_order();
        self.entries.insert(
            container.clone(),
            SlotEntry {
                handle,
                ad_unit_path: request.ad_unit_path.clone(),
                sizes,
                state: SlotState::Registered,
                display_count: 0,
                order,
            },
        );

        self.ensure_services_enabled(exchange);

        exchange.display(&container);
        if let Some(entry) = self.entries.get_mut(&container) {
            entry.state = SlotState::Displayed;
            entry.display_count = 1;
        }

        tracing::info!(
            ad_unit = %request.ad_unit_path,
            container = %container,
            "Loaded exchange fallback"
        );
        Ok(CommandOutcome::Created(container))
    }

    /// Run the global service setup if it has not run yet.
    fn ensure_services_enabled(&mut self, exchange: &mut dyn ExchangeService) {
        if self.services == ServicesState::Enabled {
            return;
        }
        self.services = ServicesState::Enabled;

        exchange.enable_single_request();
        exchange.collapse_empty_divs();
        exchange.set_centering(true);
        exchange.set_privacy_settings(DEFAULT_PRIVACY);
        exchange.enable_services();
        tracing::debug!("Exchange services enabled");
    }

    fn take_order(&mut self) -> u64 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    pub fn services_state(&self) -> ServicesState {
        self.services
    }

    pub fn entry(&self, container: &ContainerId) -> Option<&SlotEntry> {
        self.entries.get(container)
    }

    /// Lifecycle state of a container; `None` means absent.
    pub fn state(&self, container: &ContainerId) -> Option<SlotState> {
        self.entries.get(container).map(|e| e.state)
    }

    pub fn is_failed(&self, container: &ContainerId) -> bool {
        self.failed.contains(container)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered slots in registration order.
    pub fn debug_slots(&self) -> Vec<SlotSummary> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by_key(|(_, entry)| entry.order);
        entries
            .into_iter()
            .map(|(container, entry)| SlotSummary {
                ad_unit_path: entry.ad_unit_path.clone(),
                container: container.clone(),
                sizes: entry.sizes.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::sim::{ExchangeCall, SimExchange};
    use crate::viewport::{DESKTOP_SIZES, MOBILE_SIZES};

    const DESKTOP: u32 = 1400;

    fn show(container: &str) -> ExchangeCommand {
        ExchangeCommand::ShowSlot(
            SlotRequest::new(ContainerId::from(container), "/1234/site/unit")
                .with_targeting("topics", vec!["cars".into(), "loans".into()])
                .with_targeting("campaign", vec!["news".into()]),
        )
    }

    fn loaded_exchange() -> SimExchange {
        let mut exchange = SimExchange::default();
        exchange.set_loaded(true);
        exchange
    }

    #[test]
    fn test_queue_is_created_lazily() {
        let mut registry = AdSlotRegistry::new();
        assert!(registry.command_queue().is_none());

        registry.enqueue(show("rfsbox1"));
        assert_eq!(registry.pending_commands(), 1);
    }

    #[test]
    fn test_commands_wait_until_flushed() {
        let mut registry = AdSlotRegistry::new();
        registry.enqueue(show("rfsbox1"));
        registry.enqueue(show("rfsbox1"));
        assert!(registry.is_empty());

        let mut exchange = loaded_exchange();
        let outcomes = registry.flush(&mut exchange, DESKTOP);

        assert_eq!(
            outcomes,
            vec![
                CommandOutcome::Created(ContainerId::from("rfsbox1")),
                CommandOutcome::Redisplayed(ContainerId::from("rfsbox1")),
            ]
        );
        assert_eq!(registry.pending_commands(), 0);
    }

    #[test]
    fn test_first_show_runs_full_sequence_in_order() {
        let mut registry = AdSlotRegistry::new();
        let mut exchange = loaded_exchange();
        registry.execute(show("rfsbox1"), &mut exchange, DESKTOP);

        let container = ContainerId::from("rfsbox1");
        let calls = exchange.calls();
        assert!(matches!(&calls[0], ExchangeCall::DefineSlot { sizes, .. } if sizes == DESKTOP_SIZES));
        assert!(matches!(calls[1], ExchangeCall::AddService(_)));
        assert!(matches!(&calls[2], ExchangeCall::SetTargeting { key, .. } if key == "topics"));
        assert!(matches!(&calls[3], ExchangeCall::SetTargeting { key, .. } if key == "campaign"));
        assert_eq!(calls[4], ExchangeCall::EnableSingleRequest);
        assert_eq!(calls[5], ExchangeCall::CollapseEmptyDivs);
        assert_eq!(calls[6], ExchangeCall::SetCentering(true));
        assert_eq!(calls[7], ExchangeCall::SetPrivacySettings(DEFAULT_PRIVACY));
        assert_eq!(calls[8], ExchangeCall::EnableServices);
        assert_eq!(calls[9], ExchangeCall::Display(container.clone()));
        assert_eq!(calls.len(), 10);

        assert_eq!(registry.state(&container), Some(SlotState::Displayed));
        assert_eq!(registry.services_state(), ServicesState::Enabled);
    }

    #[test]
    fn test_repeat_show_only_displays() {
        let mut registry = AdSlotRegistry::new();
        let mut exchange = loaded_exchange();
        let container = ContainerId::from("rfsbox1");

        for _ in 0..4 {
            registry.execute(show("rfsbox1"), &mut exchange, DESKTOP);
        }

        assert_eq!(exchange.define_count(), 1);
        assert_eq!(exchange.enable_services_count(), 1);
        assert_eq!(exchange.display_count(&container), 4);
        assert_eq!(registry.entry(&container).unwrap().display_count, 4);
    }

    #[test]
    fn test_services_enabled_once_across_containers() {
        let mut registry = AdSlotRegistry::new();
        let mut exchange = loaded_exchange();

        registry.execute(show("rfsbox1"), &mut exchange, DESKTOP);
        registry.execute(show("rfsbox2"), &mut exchange, DESKTOP);
        registry.execute(show("sidebar"), &mut exchange, DESKTOP);

        assert_eq!(exchange.define_count(), 3);
        assert_eq!(exchange.enable_services_count(), 1);
        assert_eq!(
            exchange.count(|c| matches!(c, ExchangeCall::EnableSingleRequest)),
            1
        );
    }

    #[test]
    fn test_failed_definition_is_terminal_for_container_only() {
        let mut registry = AdSlotRegistry::new();
        let mut exchange = loaded_exchange();
        exchange.fail_slot("rfsbox1");

        let outcome = registry.execute(show("rfsbox1"), &mut exchange, DESKTOP);
        assert!(matches!(
            outcome,
            CommandOutcome::Failed(RegistryError::SlotCreationFailed { .. })
        ));
        assert!(registry.is_failed(&ContainerId::from("rfsbox1")));
        assert_eq!(exchange.enable_services_count(), 0);

        let outcome = registry.execute(show("rfsbox1"), &mut exchange, DESKTOP);
        assert!(matches!(
            outcome,
            CommandOutcome::Failed(RegistryError::ContainerFailed(_))
        ));
        assert_eq!(exchange.define_count(), 1);

        let outcome = registry.execute(show("rfsbox2"), &mut exchange, DESKTOP);
        assert_eq!(outcome, CommandOutcome::Created(ContainerId::from("rfsbox2")));
        assert_eq!(exchange.enable_services_count(), 1);
    }

    #[test]
    fn test_adopts_slot_defined_elsewhere() {
        let mut registry = AdSlotRegistry::new();
        let mut exchange = loaded_exchange();
        exchange.add_foreign_slot("/99/other", "rfsbox1");

        let outcome = registry.execute(show("rfsbox1"), &mut exchange, DESKTOP);

        assert_eq!(outcome, CommandOutcome::Adopted(ContainerId::from("rfsbox1")));
        assert_eq!(exchange.define_count(), 0);
        assert_eq!(exchange.display_count(&ContainerId::from("rfsbox1")), 1);
        assert_eq!(registry.debug_slots()[0].ad_unit_path, "/99/other");
    }

    #[test]
    fn test_adopted_slot_enables_services_before_display() {
        let mut registry = AdSlotRegistry::new();
        let mut exchange = loaded_exchange();
        exchange.add_foreign_slot("/99/other", "rfsbox1");

        registry.execute(show("rfsbox1"), &mut exchange, DESKTOP);
        registry.execute(show("rfsbox1"), &mut exchange, DESKTOP);

        assert_eq!(exchange.enable_services_count(), 1);
        assert_eq!(registry.services_state(), ServicesState::Enabled);

        let calls = exchange.calls();
        let position = |call: &ExchangeCall| calls.iter().position(|c| c == call).unwrap();
        assert!(
            position(&ExchangeCall::EnableServices)
                < position(&ExchangeCall::Display(ContainerId::from("rfsbox1")))
        );
    }

    #[test]
    fn test_sizes_follow_viewport_at_definition() {
        let mut registry = AdSlotRegistry::new();
        let mut exchange = loaded_exchange();

        registry.execute(show("rfsbox1"), &mut exchange, 500);

        assert_eq!(registry.debug_slots()[0].sizes, MOBILE_SIZES.to_vec());
    }

    #[test]
    fn test_refresh_only_with_registered_slots() {
        let mut registry = AdSlotRegistry::new();
        let mut exchange = loaded_exchange();

        assert_eq!(
            registry.execute(ExchangeCommand::Refresh, &mut exchange, DESKTOP),
            CommandOutcome::Refreshed(0)
        );
        assert!(exchange.calls().is_empty());

        registry.execute(show("rfsbox1"), &mut exchange, DESKTOP);
        assert_eq!(
            registry.execute(ExchangeCommand::Refresh, &mut exchange, DESKTOP),
            CommandOutcome::Refreshed(1)
        );
        assert_eq!(exchange.count(|c| matches!(c, ExchangeCall::Refresh)), 1);
    }

    #[test]
    fn test_debug_slots_in_registration_order() {
        let mut registry = AdSlotRegistry::new();
        assert!(registry.debug_slots().is_empty());

        let mut exchange = loaded_exchange();
        registry.execute(show("zeta"), &mut exchange, 900);
        registry.execute(show("alpha"), &mut exchange, 900);

        let slots = registry.debug_slots();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].container, ContainerId::from("zeta"));
        assert_eq!(slots[1].container, ContainerId::from("alpha"));
        assert_eq!(
            slots[0].to_string(),
            "/1234/site/unit in #zeta [728x90, 468x60, 300x250, 336x280]"
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_one_slot_per_container_under_any_order(
                attempts in prop::collection::vec(0usize..4, 1..40)
            ) {
                let names = ["rfsbox1", "rfsbox2", "sidebar", "footer"];
                let mut registry = AdSlotRegistry::new();
                let mut exchange = loaded_exchange();

                for &i in &attempts {
                    registry.enqueue(show(names[i]));
                }
                registry.flush(&mut exchange, DESKTOP);

                let distinct: BTreeSet<_> = attempts.iter().collect();
                prop_assert_eq!(exchange.define_count(), distinct.len());
                prop_assert_eq!(exchange.enable_services_count(), 1);
                prop_assert_eq!(registry.len(), distinct.len());

                for &i in &distinct {
                    let container = ContainerId::from(names[*i]);
                    let shown = attempts.iter().filter(|&&a| a == *i).count();
                    prop_assert_eq!(exchange.display_count(&container), shown);
                }
            }
        }
    }
}
