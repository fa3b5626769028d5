//! Configuration error types.

use thiserror::Error;

use super::AdType;

/// Reasons a loader configuration is rejected.
///
/// Any of these aborts the session before it touches the page.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required identifier is absent or blank.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// The ad type is not one of the supported fallback networks.
    #[error("unknown ad type '{0}' (expected 'exchange' or 'sense')")]
    UnknownAdType(String),

    /// Fallback is enabled but the identifiers for the selected network are missing.
    #[error("fallback for {ad_type} requires '{field}'")]
    MissingFallbackField {
        ad_type: AdType,
        field: &'static str,
    },

    /// The configuration document is not valid JSON for the expected shape.
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}
