//! Unvalidated configuration as delivered by the page.
//!
//! Page snippets in the wild use two spellings: descriptive camelCase keys and
//! the compact keys of the deployed loader snippet. Both are
//! accepted here; [`LoaderConfig`](super::LoaderConfig) does the validation.

use serde::{Deserialize, Serialize};

/// Configuration exactly as received, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    #[serde(default, alias = "p", skip_serializing_if = "Option::is_none")]
    pub publisher_id: Option<String>,

    #[serde(default, alias = "s", skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,

    #[serde(default, alias = "c", skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,

    /// `exchange`/`adx` or `sense`/`adsense`.
    #[serde(default, alias = "at", skip_serializing_if = "Option::is_none")]
    pub ad_type: Option<String>,

    #[serde(default, alias = "fb", skip_serializing_if = "Option::is_none")]
    pub fallback_enabled: Option<FlagValue>,

    #[serde(default, alias = "u", skip_serializing_if = "Option::is_none")]
    pub results_page_origin: Option<String>,

    /// Comma-separated topic list.
    #[serde(default, alias = "t", skip_serializing_if = "Option::is_none")]
    pub topics: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,

    #[serde(default, alias = "r", skip_serializing_if = "Option::is_none")]
    pub referrer_creative_text: Option<String>,

    #[serde(default, alias = "n", skip_serializing_if = "Option::is_none")]
    pub related_search_count: Option<u32>,

    #[serde(default, alias = "f", skip_serializing_if = "Option::is_none")]
    pub pixel_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<RawFallback>,

    /// Compact spelling of `fallback.publisherClientId`.
    #[serde(default, rename = "pc", skip_serializing_if = "Option::is_none")]
    pub compact_client_id: Option<String>,

    /// Compact slot key: the ad-unit path for exchange, the slot id for sense.
    #[serde(default, rename = "sl", skip_serializing_if = "Option::is_none")]
    pub compact_slot: Option<String>,
}

/// Fallback network identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFallback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<String>,
}

/// A boolean that may arrive as `true`, `1` or `"1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl FlagValue {
    pub fn is_enabled(&self) -> bool {
        match self {
            FlagValue::Bool(b) => *b,
            FlagValue::Number(n) => *n == 1,
            FlagValue::Text(s) => s.trim() == "1",
        }
    }
}

impl RawConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_descriptive_keys() {
        let raw: RawConfig = serde_json::from_value(json!({
            "publisherId": "partner-pub-1",
            "styleId": "42",
            "channelId": "ch",
            "adType": "exchange",
            "fallbackEnabled": true,
            "fallback": { "slotPath": "/1234/site/unit" }
        }))
        .unwrap();

        assert_eq!(raw.publisher_id.as_deref(), Some("partner-pub-1"));
        assert_eq!(raw.ad_type.as_deref(), Some("exchange"));
        assert_eq!(raw.fallback_enabled, Some(FlagValue::Bool(true)));
        assert_eq!(
            raw.fallback.unwrap().slot_path.as_deref(),
            Some("/1234/site/unit")
        );
    }

    #[test]
    fn test_parses_compact_keys() {
        let raw = RawConfig::from_json(
            r#"{"p":"pub","s":"7","c":"chan","at":"adx","fb":"1","sl":"/1/a","n":3,"f":"px"}"#,
        )
        .unwrap();

        assert_eq!(raw.publisher_id.as_deref(), Some("pub"));
        assert_eq!(raw.style_id.as_deref(), Some("7"));
        assert_eq!(raw.channel_id.as_deref(), Some("chan"));
        assert_eq!(raw.ad_type.as_deref(), Some("adx"));
        assert_eq!(raw.compact_slot.as_deref(), Some("/1/a"));
        assert_eq!(raw.related_search_count, Some(3));
        assert_eq!(raw.pixel_id.as_deref(), Some("px"));
        assert!(raw.fallback_enabled.unwrap().is_enabled());
    }

    #[test]
    fn test_flag_values() {
        assert!(FlagValue::Bool(true).is_enabled());
        assert!(!FlagValue::Bool(false).is_enabled());
        assert!(FlagValue::Number(1).is_enabled());
        assert!(!FlagValue::Number(0).is_enabled());
        assert!(FlagValue::Text("1".into()).is_enabled());
        assert!(!FlagValue::Text("0".into()).is_enabled());
        assert!(!FlagValue::Text("yes".into()).is_enabled());
    }

    #[test]
    fn test_empty_object_is_all_none() {
        let raw = RawConfig::from_json("{}").unwrap();
        assert_eq!(raw, RawConfig::default());
    }
}
