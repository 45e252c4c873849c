pub mod browser_manager;
pub mod extractor;
pub mod renderer;

use crate::core::error::ScrapeError;
use crate::core::types::InteractionLog;
use async_trait::async_trait;
use std::time::Duration;

/// A candidate element the interaction driver should try to click.
///
/// Text-matching variants exist because "load more" controls rarely carry a
/// stable selector; the driver locates them by their visible text instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// Plain CSS selector; the first match is clicked.
    Css(String),
    /// `<button>` whose text contains the phrase, case-insensitively.
    ButtonText(String),
    /// `<a>` whose text contains the phrase, case-insensitively.
    AnchorText(String),
}

impl ClickTarget {
    /// Selector string recorded in the interaction log.
    pub fn selector(&self) -> String {
        match self {
            ClickTarget::Css(selector) => selector.clone(),
            ClickTarget::ButtonText(phrase) => format!("button:has-text(\"{phrase}\")"),
            ClickTarget::AnchorText(phrase) => format!("a:has-text(\"{phrase}\")"),
        }
    }
}

/// Boundary to the browser-automation engine. The pipeline depends only on
/// this trait, so tests can swap in a canned implementation and the CDP
/// machinery stays behind one seam.
#[async_trait]
pub trait DynamicRenderer: Send + Sync {
    /// Plain render without interaction, used as the last-resort fallback.
    async fn render(&self, url: &str, timeout: Duration) -> Result<String, ScrapeError>;

    /// Render with scroll/click/pagination simulation. Per-step failures
    /// are recorded in the returned log; only total session failure yields
    /// a `None` document.
    async fn render_with_interactions(
        &self,
        url: &str,
        scroll_depth: u32,
        targets: &[ClickTarget],
    ) -> (Option<String>, InteractionLog);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_target_selectors_match_their_shape() {
        assert_eq!(
            ClickTarget::Css("[role=\"tab\"]".into()).selector(),
            "[role=\"tab\"]"
        );
        assert_eq!(
            ClickTarget::ButtonText("load more".into()).selector(),
            "button:has-text(\"load more\")"
        );
        assert_eq!(
            ClickTarget::AnchorText("see more".into()).selector(),
            "a:has-text(\"see more\")"
        );
    }
}
