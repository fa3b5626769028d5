//! `validate` command.

use std::path::Path;

use adfallback::config::{results_page_url, FallbackTarget};
use adfallback::LoaderConfig;

use super::common::read_config;
use crate::error::CliError;

/// Placeholder shown where the page origin would be substituted.
const PAGE_ORIGIN_PLACEHOLDER: &str = "<page-origin>";

/// Validate a configuration file and print the accepted values.
pub fn run(path: &Path) -> Result<(), CliError> {
    let config = LoaderConfig::try_from(read_config(path)?)?;

    println!("Configuration OK: {}", path.display());
    println!("  Publisher:   {}", config.publisher_id());
    println!("  Style:       {}", config.style_id());
    println!("  Channel:     {}", config.channel_id());
    println!(
        "  Fallback:    {} ({})",
        config.ad_type(),
        if config.fallback_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    );
    match config.fallback() {
        Some(FallbackTarget::Exchange { slot_path }) => {
            println!("  Ad unit:     {}", slot_path);
        }
        Some(FallbackTarget::Sense {
            publisher_client_id,
            slot_id,
        }) => {
            println!("  Client:      {}", publisher_client_id);
            println!("  Slot:        {}", slot_id);
        }
        None => {}
    }
    if !config.topics().is_empty() {
        println!("  Topics:      {}", config.topics().join(", "));
    }
    println!("  Campaign:    {}", config.campaign());
    println!("  Searches:    {}", config.related_search_count());
    if let Some(pixel) = config.pixel_id() {
        println!("  Pixel:       {}", pixel);
    }
    println!(
        "  Results URL: {}",
        results_page_url(&config, PAGE_ORIGIN_PLACEHOLDER)
    );
    Ok(())
}
