//! Loader configuration.
//!
//! The page hands the loader a JSON object. It is parsed into a [`RawConfig`]
//! and validated exactly once into a [`LoaderConfig`]; nothing downstream
//! ever sees an unvalidated value.
//!
//! # Example
//!
//! ```
//! use adfallback::config::{AdType, LoaderConfig};
//!
//! let config = LoaderConfig::from_json(
//!     r#"{"p":"partner-pub-1","s":"42","c":"news","at":"adx","fb":"1","sl":"/1/site/unit"}"#,
//! )?;
//! assert_eq!(config.ad_type(), AdType::Exchange);
//! assert_eq!(config.exchange_slot_path(), Some("/1/site/unit"));
//! # Ok::<(), adfallback::config::ConfigError>(())
//! ```

mod error;
mod model;
mod raw;
mod request;
mod timings;

pub use error::ConfigError;
pub use model::{AdType, FallbackTarget, LoaderConfig, DEFAULT_RELATED_SEARCH_COUNT};
pub use raw::{FlagValue, RawConfig, RawFallback};
pub use request::{
    results_page_url, PageOptions, PrimaryRequest, SearchBlock, PRIMARY_CONTAINER,
    RELATED_SEARCH_MODE, RESULTS_PAGE_QUERY_PARAM, SECONDARY_CONTAINER,
};
pub use timings::{LoaderTimings, DEFAULT_RENDER_GRACE_MS};

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn raw_exchange() -> RawConfig {
        RawConfig {
            publisher_id: Some("partner-pub-1".into()),
            style_id: Some("42".into()),
            channel_id: Some("news".into()),
            ad_type: Some("exchange".into()),
            fallback_enabled: Some(FlagValue::Bool(true)),
            topics: Some("cars,loans".into()),
            fallback: Some(RawFallback {
                slot_path: Some("/1234/site/unit".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn raw_sense() -> RawConfig {
        RawConfig {
            publisher_id: Some("partner-pub-1".into()),
            style_id: Some("42".into()),
            channel_id: Some("news".into()),
            ad_type: Some("sense".into()),
            fallback_enabled: Some(FlagValue::Bool(true)),
            fallback: Some(RawFallback {
                publisher_client_id: Some("ca-pub-1".into()),
                slot_id: Some("9876".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn exchange_config() -> LoaderConfig {
        LoaderConfig::try_from(raw_exchange()).expect("fixture is valid")
    }

    pub fn sense_config() -> LoaderConfig {
        LoaderConfig::try_from(raw_sense()).expect("fixture is valid")
    }

    pub fn disabled_config() -> LoaderConfig {
        let mut raw = raw_exchange();
        raw.fallback_enabled = Some(FlagValue::Bool(false));
        LoaderConfig::try_from(raw).expect("fixture is valid")
    }
}
