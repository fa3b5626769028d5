//! Validated loader configuration.

use std::fmt;
use std::str::FromStr;

use super::error::ConfigError;
use super::raw::RawConfig;

/// Related searches requested per block when the page does not say.
pub const DEFAULT_RELATED_SEARCH_COUNT: u32 = 5;

/// Secondary network used when the primary network renders nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdType {
    /// Display ads through the exchange publisher tag.
    Exchange,
    /// Responsive display units pushed onto the sense queue.
    Sense,
}

impl AdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdType::Exchange => "exchange",
            AdType::Sense => "sense",
        }
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exchange" | "adx" => Ok(AdType::Exchange),
            "sense" | "adsense" => Ok(AdType::Sense),
            _ => Err(ConfigError::UnknownAdType(s.to_string())),
        }
    }
}

/// Identifiers for the fallback network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackTarget {
    Exchange {
        /// Ad-unit path, e.g. `/12345/site/unit`.
        slot_path: String,
    },
    Sense {
        publisher_client_id: String,
        slot_id: String,
    },
}

/// A configuration that passed validation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    publisher_id: String,
    style_id: String,
    channel_id: String,
    ad_type: AdType,
    fallback_enabled: bool,
    results_page_origin: Option<String>,
    topics: Vec<String>,
    campaign_id: Option<String>,
    referrer_creative_text: Option<String>,
    related_search_count: u32,
    pixel_id: Option<String>,
    fallback: Option<FallbackTarget>,
}

impl LoaderConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw = RawConfig::from_json(json)?;
        Self::try_from(raw)
    }

    pub fn publisher_id(&self) -> &str {
        &self.publisher_id
    }

    pub fn style_id(&self) -> &str {
        &self.style_id
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn ad_type(&self) -> AdType {
        self.ad_type
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback_enabled
    }

    pub fn results_page_origin(&self) -> Option<&str> {
        self.results_page_origin.as_deref()
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Campaign used for targeting and the results page. Falls back to the
    /// channel id when the page does not set one.
    pub fn campaign(&self) -> &str {
        self.campaign_id.as_deref().unwrap_or(&self.channel_id)
    }

    pub fn referrer_creative_text(&self) -> Option<&str> {
        self.referrer_creative_text.as_deref()
    }

    pub fn related_search_count(&self) -> u32 {
        self.related_search_count
    }

    pub fn pixel_id(&self) -> Option<&str> {
        self.pixel_id.as_deref()
    }

    /// Fallback identifiers. Always `Some` when fallback is enabled.
    pub fn fallback(&self) -> Option<&FallbackTarget> {
        self.fallback.as_ref()
    }

    /// Ad-unit path for exchange fallback, if configured.
    pub fn exchange_slot_path(&self) -> Option<&str> {
        match &self.fallback {
            Some(FallbackTarget::Exchange { slot_path }) => Some(slot_path),
            _ => None,
        }
    }
}

/// Trimmed, non-empty value or `None`.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    present(value).ok_or(ConfigError::MissingField(field))
}

impl TryFrom<RawConfig> for LoaderConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let publisher_id = required(raw.publisher_id, "publisherId")?;
        let style_id = required(raw.style_id, "styleId")?;
        let channel_id = required(raw.channel_id, "channelId")?;

        let ad_type = match present(raw.ad_type) {
            Some(s) => s.parse()?,
            None => AdType::Sense,
        };
        let fallback_enabled = raw
            .fallback_enabled
            .map(|flag| flag.is_enabled())
            .unwrap_or(false);

        let nested = raw.fallback.unwrap_or_default();
        let fallback = match ad_type {
            AdType::Exchange => {
                present(nested.slot_path.or(raw.compact_slot))
                    .map(|slot_path| FallbackTarget::Exchange { slot_path })
            }
            AdType::Sense => {
                let client = present(nested.publisher_client_id.or(raw.compact_client_id));
                let slot = present(nested.slot_id.or(raw.compact_slot));
                match (client, slot) {
                    (Some(publisher_client_id), Some(slot_id)) => Some(FallbackTarget::Sense {
                        publisher_client_id,
                        slot_id,
                    }),
                    (None, _) if fallback_enabled => {
                        return Err(ConfigError::MissingFallbackField {
                            ad_type,
                            field: "fallback.publisherClientId",
                        })
                    }
                    (_, None) if fallback_enabled => {
                        return Err(ConfigError::MissingFallbackField {
                            ad_type,
                            field: "fallback.slotId",
                        })
                    }
                    _ => None,
                }
            }
        };

        if fallback_enabled && fallback.is_none() {
            return Err(ConfigError::MissingFallbackField {
                ad_type,
                field: "fallback.slotPath",
            });
        }

        let topics = present(raw.topics)
            .map(|t| {
                t.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let related_search_count = raw
            .related_search_count
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_RELATED_SEARCH_COUNT);

        Ok(Self {
            publisher_id,
            style_id,
            channel_id,
            ad_type,
            fallback_enabled,
            results_page_origin: present(raw.results_page_origin),
            topics,
            campaign_id: present(raw.campaign_id),
            referrer_creative_text: present(raw.referrer_creative_text),
            related_search_count,
            pixel_id: present(raw.pixel_id),
            fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<LoaderConfig, ConfigError> {
        LoaderConfig::from_json(&value.to_string())
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = parse(json!({"p": "pub", "s": "1", "c": "ch"})).unwrap();

        assert_eq!(config.ad_type(), AdType::Sense);
        assert!(!config.fallback_enabled());
        assert_eq!(config.related_search_count(), DEFAULT_RELATED_SEARCH_COUNT);
        assert!(config.topics().is_empty());
        assert_eq!(config.campaign(), "ch");
        assert!(config.fallback().is_none());
    }

    #[test]
    fn test_each_required_field_is_checked() {
        for (missing, field) in [("p", "publisherId"), ("s", "styleId"), ("c", "channelId")] {
            let mut value = json!({"p": "pub", "s": "1", "c": "ch"});
            value.as_object_mut().unwrap().remove(missing);

            let err = parse(value).unwrap_err();
            assert!(
                matches!(err, ConfigError::MissingField(f) if f == field),
                "expected missing {field}, got {err}"
            );
        }
    }

    #[test]
    fn test_blank_required_field_is_missing() {
        let err = parse(json!({"p": "  ", "s": "1", "c": "ch"})).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("publisherId")));
    }

    #[test]
    fn test_ad_type_spellings() {
        assert_eq!("adx".parse::<AdType>().unwrap(), AdType::Exchange);
        assert_eq!("Exchange".parse::<AdType>().unwrap(), AdType::Exchange);
        assert_eq!("adsense".parse::<AdType>().unwrap(), AdType::Sense);
        assert!(matches!(
            "banner".parse::<AdType>(),
            Err(ConfigError::UnknownAdType(_))
        ));
    }

    #[test]
    fn test_compact_slot_is_exchange_path() {
        let config = parse(json!({
            "p": "pub", "s": "1", "c": "ch", "at": "adx", "fb": "1", "sl": "/1/site/unit"
        }))
        .unwrap();

        assert!(config.fallback_enabled());
        assert_eq!(config.exchange_slot_path(), Some("/1/site/unit"));
    }

    #[test]
    fn test_compact_slot_is_sense_slot_id() {
        let config = parse(json!({
            "p": "pub", "s": "1", "c": "ch", "fb": "1", "pc": "ca-pub-9", "sl": "555"
        }))
        .unwrap();

        assert_eq!(
            config.fallback(),
            Some(&FallbackTarget::Sense {
                publisher_client_id: "ca-pub-9".to_string(),
                slot_id: "555".to_string(),
            })
        );
    }

    #[test]
    fn test_enabled_exchange_requires_slot_path() {
        let err = parse(json!({
            "p": "pub", "s": "1", "c": "ch", "adType": "exchange", "fallbackEnabled": true
        }))
        .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::MissingFallbackField {
                ad_type: AdType::Exchange,
                field: "fallback.slotPath"
            }
        ));
    }

    #[test]
    fn test_enabled_sense_requires_both_ids() {
        let err = parse(json!({
            "p": "pub", "s": "1", "c": "ch", "fallbackEnabled": true,
            "fallback": {"slotId": "1"}
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingFallbackField {
                field: "fallback.publisherClientId",
                ..
            }
        ));

        let err = parse(json!({
            "p": "pub", "s": "1", "c": "ch", "fallbackEnabled": true,
            "fallback": {"publisherClientId": "ca-pub-1"}
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingFallbackField {
                field: "fallback.slotId",
                ..
            }
        ));
    }

    #[test]
    fn test_disabled_fallback_does_not_need_ids() {
        let config = parse(json!({
            "p": "pub", "s": "1", "c": "ch", "adType": "exchange", "fallbackEnabled": false
        }))
        .unwrap();
        assert!(config.fallback().is_none());
    }

    #[test]
    fn test_topics_and_campaign() {
        let config = parse(json!({
            "p": "pub", "s": "1", "c": "ch",
            "topics": "cars, insurance,,loans", "campaignId": "spring"
        }))
        .unwrap();

        assert_eq!(config.topics(), ["cars", "insurance", "loans"]);
        assert_eq!(config.campaign(), "spring");
    }

    #[test]
    fn test_zero_related_search_count_uses_default() {
        let config = parse(json!({"p": "pub", "s": "1", "c": "ch", "n": 0})).unwrap();
        assert_eq!(config.related_search_count(), DEFAULT_RELATED_SEARCH_COUNT);
    }
}
