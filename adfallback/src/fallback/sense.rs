//! Sense fallback loader.

use crate::config::{FallbackTarget, LoaderConfig};
use crate::host::{ContainerId, Host, SenseUnit};

/// Class the sense SDK looks for when filling units.
pub const SENSE_CLASS: &str = "adsbygoogle";

/// Marked element for the configured sense client and slot.
///
/// Returns `None` when the configuration carries no sense identifiers.
pub fn sense_unit(config: &LoaderConfig) -> Option<SenseUnit> {
    match config.fallback()? {
        FallbackTarget::Sense {
            publisher_client_id,
            slot_id,
        } => Some(SenseUnit {
            class_name: SENSE_CLASS.to_string(),
            display: "block".to_string(),
            client: publisher_client_id.clone(),
            slot: slot_id.clone(),
            format: "auto".to_string(),
            full_width_responsive: true,
        }),
        FallbackTarget::Exchange { .. } => None,
    }
}

/// Replace the container's content with a sense unit and push a fill request.
///
/// Returns `false` without touching the page if there is nothing to load.
pub fn load(host: &mut dyn Host, config: &LoaderConfig, container: &ContainerId) -> bool {
    let Some(unit) = sense_unit(config) else {
        return false;
    };
    let page = host.page();
    page.clear_container(container);
    page.append_sense_unit(container, &unit);
    host.sense().push();
    tracing::info!(container = %container, slot = %unit.slot, "Loaded sense fallback");
    true
}
