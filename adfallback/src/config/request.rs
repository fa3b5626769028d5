//! The related-search request sent to the primary network.

use super::LoaderConfig;

/// Mode passed as the first argument of the primary entry point.
pub const RELATED_SEARCH_MODE: &str = "relatedsearch";

/// Container the primary network fills first. Render checks and fallback use it.
pub const PRIMARY_CONTAINER: &str = "rfsbox1";

/// Second related-search block.
pub const SECONDARY_CONTAINER: &str = "rfsbox2";

/// Query parameter the results page reads the search term from.
pub const RESULTS_PAGE_QUERY_PARAM: &str = "s";

const DEFAULT_TERMS: &str = "default";
const DEFAULT_REFERRER_CREATIVE: &str = "Related content";

/// Page-level options of the primary request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOptions {
    pub pub_id: String,
    pub style_id: String,
    pub channel: String,
    pub results_page_base_url: String,
    pub results_page_query_param: String,
    pub related_search_targeting: String,
    pub adsafe: String,
    pub terms: String,
    pub referrer_ad_creative: String,
}

/// One related-search block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBlock {
    pub container: String,
    pub related_searches: u32,
}

/// Arguments of the primary entry point: `(mode, options, block1, block2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryRequest {
    pub mode: &'static str,
    pub options: PageOptions,
    pub blocks: [SearchBlock; 2],
}

impl PrimaryRequest {
    /// Build the request for a validated configuration.
    ///
    /// `page_origin` is used as the results page base when the configuration
    /// does not name one.
    pub fn new(config: &LoaderConfig, page_origin: &str) -> Self {
        let terms = if config.topics().is_empty() {
            DEFAULT_TERMS.to_string()
        } else {
            config.topics().join(",")
        };

        let options = PageOptions {
            pub_id: config.publisher_id().to_string(),
            style_id: config.style_id().to_string(),
            channel: config.channel_id().to_string(),
            results_page_base_url: results_page_url(config, page_origin),
            results_page_query_param: RESULTS_PAGE_QUERY_PARAM.to_string(),
            related_search_targeting: "content".to_string(),
            adsafe: "low".to_string(),
            terms,
            referrer_ad_creative: config
                .referrer_creative_text()
                .unwrap_or(DEFAULT_REFERRER_CREATIVE)
                .to_string(),
        };

        let block = |container: &str| SearchBlock {
            container: container.to_string(),
            related_searches: config.related_search_count(),
        };

        Self {
            mode: RELATED_SEARCH_MODE,
            options,
            blocks: [block(PRIMARY_CONTAINER), block(SECONDARY_CONTAINER)],
        }
    }
}

/// Results page URL: base followed by `fbid`, `campid` and `gads` parameters.
pub fn results_page_url(config: &LoaderConfig, page_origin: &str) -> String {
    let base = config.results_page_origin().unwrap_or(page_origin);

    let mut params = Vec::with_capacity(3);
    if let Some(pixel) = config.pixel_id() {
        params.push(format!("fbid={}", pixel));
    }
    params.push(format!("campid={}", config.campaign()));
    params.push(format!("gads={}", config.style_id()));

    format!("{}?{}", base, params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: serde_json::Value) -> LoaderConfig {
        LoaderConfig::from_json(&value.to_string()).unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let req = PrimaryRequest::new(
            &config(json!({"p": "pub", "s": "9", "c": "ch"})),
            "https://news.example",
        );

        assert_eq!(req.mode, "relatedsearch");
        assert_eq!(req.options.pub_id, "pub");
        assert_eq!(req.options.terms, "default");
        assert_eq!(req.options.referrer_ad_creative, "Related content");
        assert_eq!(req.options.results_page_query_param, "s");
        assert_eq!(req.options.adsafe, "low");
        assert_eq!(req.blocks[0].container, "rfsbox1");
        assert_eq!(req.blocks[1].container, "rfsbox2");
        assert_eq!(req.blocks[1].related_searches, 5);
    }

    #[test]
    fn test_results_page_url_uses_page_origin() {
        let url = results_page_url(
            &config(json!({"p": "pub", "s": "9", "c": "ch"})),
            "https://news.example",
        );
        assert_eq!(url, "https://news.example?campid=ch&gads=9");
    }

    #[test]
    fn test_results_page_url_with_all_params() {
        let url = results_page_url(
            &config(json!({
                "p": "pub", "s": "9", "c": "ch", "f": "777",
                "u": "https://search.example/r", "campaignId": "spring"
            })),
            "https://news.example",
        );
        assert_eq!(url, "https://search.example/r?fbid=777&campid=spring&gads=9");
    }

    #[test]
    fn test_terms_and_counts_follow_config() {
        let req = PrimaryRequest::new(
            &config(json!({"p": "pub", "s": "9", "c": "ch", "t": "a,b", "n": 8, "r": "More"})),
            "https://news.example",
        );
        assert_eq!(req.options.terms, "a,b");
        assert_eq!(req.options.referrer_ad_creative, "More");
        assert!(req.blocks.iter().all(|b| b.related_searches == 8));
    }
}
