//! Pre-render interaction planning.
//!
//! Inspects the static markup for controls worth clicking during a dynamic
//! render: tab widgets and "load more"-style buttons or links. The output is
//! a best-effort hint list; the driver tolerates targets that no longer
//! match the live DOM.

use crate::scraping::ClickTarget;
use aho_corasick::AhoCorasick;
use scraper::{Html, Selector};
use tracing::debug;

/// Propose a prioritized list of click targets: a `[role="tab"]` selector
/// when the page has tab widgets, then, phrase by phrase, a button target
/// and an anchor target for every phrase that appears in a `<button>` or
/// `<a>` text (case-insensitive substring).
pub fn plan_click_targets(document: &Html, phrases: &[String]) -> Vec<ClickTarget> {
    let mut targets = Vec::new();

    if let Ok(selector) = Selector::parse("[role=\"tab\"]") {
        if document.select(&selector).next().is_some() {
            targets.push(ClickTarget::Css("[role=\"tab\"]".to_string()));
        }
    }

    let Ok(matcher) = AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(phrases)
    else {
        return targets;
    };

    let mut button_hits = vec![false; phrases.len()];
    let mut anchor_hits = vec![false; phrases.len()];
    for (tag, hits) in [("button", &mut button_hits), ("a", &mut anchor_hits)] {
        let Ok(selector) = Selector::parse(tag) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element.text().collect::<String>();
            for m in matcher.find_iter(&text) {
                hits[m.pattern().as_usize()] = true;
            }
        }
    }

    for (index, phrase) in phrases.iter().enumerate() {
        if button_hits[index] {
            targets.push(ClickTarget::ButtonText(phrase.clone()));
        }
        if anchor_hits[index] {
            targets.push(ClickTarget::AnchorText(phrase.clone()));
        }
    }

    debug!(candidates = targets.len(), "interaction plan built");
    targets
}
