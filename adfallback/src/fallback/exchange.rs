//! Exchange fallback preparation.

use crate::config::LoaderConfig;
use crate::host::{ContainerId, ContainerStyle, Host};
use crate::registry::SlotRequest;

/// Publisher tag script of the exchange SDK.
pub const EXCHANGE_SCRIPT_URL: &str = "https://securepubads.g.doubleclick.net/tag/js/gpt.js";

/// Minimum container height reserved for an exchange creative.
pub const FALLBACK_MIN_HEIGHT_PX: u32 = 250;

/// Inject the exchange tag unless it is already loaded or requested.
///
/// Returns `true` if a script element was added.
pub fn ensure_script(host: &mut dyn Host) -> bool {
    if host.exchange().is_some() {
        return false;
    }
    let page = host.page();
    if page.has_script(EXCHANGE_SCRIPT_URL) {
        return false;
    }
    page.inject_script(EXCHANGE_SCRIPT_URL);
    tracing::debug!("Exchange tag requested");
    true
}

/// Reserve space in the container for the exchange creative.
pub fn prepare_container(host: &mut dyn Host, container: &ContainerId) {
    let style = ContainerStyle {
        min_height_px: FALLBACK_MIN_HEIGHT_PX,
        text_align: "center".to_string(),
    };
    host.page().style_container(container, &style);
}

/// Slot request for a container, with topic and campaign targeting.
///
/// Returns `None` when the configuration carries no exchange ad-unit path.
pub fn slot_request(config: &LoaderConfig, container: ContainerId) -> Option<SlotRequest> {
    let path = config.exchange_slot_path()?;
    Some(
        SlotRequest::new(container, path)
            .with_targeting("topics", config.topics().to_vec())
            .with_targeting("campaign", vec![config.campaign().to_string()]),
    )
}
