//! Render health check for the primary container.

use std::fmt;

use crate::host::{ContainerId, Page};

/// Why the primary network is considered to have rendered nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotRenderedReason {
    /// The entry point never became callable, so no request was made.
    PrimaryUnavailable,
    /// The container element is not in the page.
    MissingContainer,
    /// The container has no creative frame.
    MissingCreative,
    /// The creative frame exists but has zero height.
    CollapsedCreative,
}

impl NotRenderedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotRenderedReason::PrimaryUnavailable => "primary unavailable",
            NotRenderedReason::MissingContainer => "container missing",
            NotRenderedReason::MissingCreative => "no creative",
            NotRenderedReason::CollapsedCreative => "creative collapsed",
        }
    }
}

/// Outcome of the render health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderHealth {
    Rendered,
    NotRendered(NotRenderedReason),
}

impl RenderHealth {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderHealth::Rendered)
    }
}

impl fmt::Display for RenderHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderHealth::Rendered => f.write_str("rendered"),
            RenderHealth::NotRendered(reason) => write!(f, "not rendered ({})", reason.as_str()),
        }
    }
}

/// Inspect a container for a rendered creative.
///
/// A missing container, a missing creative or a zero-height creative all
/// count as not rendered.
pub fn check_rendered(page: &dyn Page, container: &ContainerId) -> RenderHealth {
    if !page.has_element(container) {
        return RenderHealth::NotRendered(NotRenderedReason::MissingContainer);
    }

    match page.creative_height(container) {
        None => RenderHealth::NotRendered(NotRenderedReason::MissingCreative),
        Some(0) => RenderHealth::NotRendered(NotRenderedReason::CollapsedCreative),
        Some(_) => RenderHealth::Rendered,
    }
}
