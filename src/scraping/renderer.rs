//! Interaction-driving renderer on top of the native headless browser.
//!
//! One interactive render performs, in fixed order: navigate and wait for
//! network quiescence, `scroll_depth` viewport scrolls, scroll back to top,
//! one click attempt per candidate target, one `[role="tab"]` click, then
//! up to `max_pagination_clicks` "next page" clicks. Each step that fails
//! is recorded in the interaction log and the sequence continues; only a
//! dead session (no browser, no page) aborts the render.

use crate::core::config::ScrapeConfig;
use crate::core::error::ScrapeError;
use crate::core::types::{ClickRecord, InteractionLog, StepFailure};
use crate::scraping::{browser_manager, ClickTarget, DynamicRenderer};
use async_trait::async_trait;
use chromiumoxide::Page;
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const TAB_SELECTOR: &str = "[role=\"tab\"]";
const QUIET_MS: u64 = 1_500;

pub struct CdpRenderer {
    config: Arc<ScrapeConfig>,
}

impl CdpRenderer {
    pub fn new(config: Arc<ScrapeConfig>) -> Self {
        Self { config }
    }

    /// Evaluate a click snippet and report whether an element was clicked.
    async fn eval_click(&self, page: &Page, script: String) -> Result<bool, ScrapeError> {
        let result = page
            .evaluate(script)
            .await
            .map_err(|e| ScrapeError::Render(format!("script evaluation failed: {e}")))?;
        Ok(result.into_value::<bool>().unwrap_or(false))
    }

    async fn drive(
        &self,
        page: &Page,
        scroll_depth: u32,
        targets: &[ClickTarget],
        log: &mut InteractionLog,
    ) -> Result<String, ScrapeError> {
        let settle = Duration::from_millis(self.config.resolve_scroll_settle_ms());
        let click_settle = Duration::from_millis(self.config.resolve_click_settle_ms());

        // Scroll passes to trigger lazy-loaded / intersection-observer content.
        for _ in 0..scroll_depth {
            match page.evaluate("window.scrollBy(0, window.innerHeight);").await {
                Ok(_) => log.scroll_count += 1,
                Err(e) => log.failures.push(StepFailure {
                    step: "scroll".to_string(),
                    reason: e.to_string(),
                }),
            }
            tokio::time::sleep(settle).await;
        }
        if let Err(e) = page.evaluate("window.scrollTo(0, 0);").await {
            log.failures.push(StepFailure {
                step: "scroll-top".to_string(),
                reason: e.to_string(),
            });
        }
        tokio::time::sleep(settle).await;

        // Candidate clicks, in planner order.
        for target in targets {
            let selector = target.selector();
            match self.eval_click(page, click_script(target)).await {
                Ok(true) => {
                    log.clicks.push(ClickRecord {
                        selector,
                        timestamp: Some(now_rfc3339()),
                    });
                    tokio::time::sleep(click_settle).await;
                }
                Ok(false) => log.failures.push(StepFailure {
                    step: format!("click {selector}"),
                    reason: "no matching element".to_string(),
                }),
                Err(e) => log.failures.push(StepFailure {
                    step: format!("click {selector}"),
                    reason: e.to_string(),
                }),
            }
        }

        // First tab, if the live DOM has one.
        match self
            .eval_click(page, click_script(&ClickTarget::Css(TAB_SELECTOR.to_string())))
            .await
        {
            Ok(true) => {
                log.clicks.push(ClickRecord {
                    selector: TAB_SELECTOR.to_string(),
                    timestamp: Some(now_rfc3339()),
                });
                tokio::time::sleep(click_settle).await;
            }
            Ok(false) => {} // no tabs on this page
            Err(e) => log.failures.push(StepFailure {
                step: "click tab".to_string(),
                reason: e.to_string(),
            }),
        }

        // Bounded pagination trail; stop on the first click that goes nowhere.
        for _ in 0..self.config.resolve_max_pagination_clicks() {
            match self.eval_click(page, next_page_script()).await {
                Ok(true) => {
                    tokio::time::sleep(click_settle).await;
                    match page.url().await {
                        Ok(Some(current)) => log.visited_pages.push(current),
                        Ok(None) => {}
                        Err(e) => {
                            log.failures.push(StepFailure {
                                step: "pagination".to_string(),
                                reason: e.to_string(),
                            });
                            break;
                        }
                    }
                }
                Ok(false) => break,
                Err(e) => {
                    log.failures.push(StepFailure {
                        step: "pagination".to_string(),
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        page.content()
            .await
            .map_err(|e| ScrapeError::Render(format!("content capture failed: {e}")))
    }
}

#[async_trait]
impl DynamicRenderer for CdpRenderer {
    async fn render(&self, url: &str, timeout: Duration) -> Result<String, ScrapeError> {
        let (mut browser, handler) = browser_manager::launch_headless().await?;

        let result = async {
            let page = browser
                .new_page(url)
                .await
                .map_err(|e| ScrapeError::Render(format!("navigation failed: {e}")))?;
            browser_manager::wait_until_stable(&page, QUIET_MS, timeout.as_millis() as u64).await;
            page.content()
                .await
                .map_err(|e| ScrapeError::Render(format!("content capture failed: {e}")))
        }
        .await;

        if let Err(e) = browser.close().await {
            warn!("browser close error (non-fatal): {e}");
        }
        handler.abort();
        result
    }

    async fn render_with_interactions(
        &self,
        url: &str,
        scroll_depth: u32,
        targets: &[ClickTarget],
    ) -> (Option<String>, InteractionLog) {
        let mut log = InteractionLog::default();

        let (mut browser, handler) = match browser_manager::launch_headless().await {
            Ok(session) => session,
            Err(e) => {
                warn!("browser session unavailable: {e}");
                log.failures.push(StepFailure {
                    step: "launch".to_string(),
                    reason: e.to_string(),
                });
                return (None, log);
            }
        };

        let nav_timeout = self.config.resolve_navigation_timeout_ms();
        let html = async {
            let page = browser
                .new_page(url)
                .await
                .map_err(|e| ScrapeError::Render(format!("navigation failed: {e}")))?;
            browser_manager::wait_until_stable(&page, QUIET_MS, nav_timeout).await;
            self.drive(&page, scroll_depth, targets, &mut log).await
        }
        .await;

        if let Err(e) = browser.close().await {
            warn!("browser close error (non-fatal): {e}");
        }
        handler.abort();

        match html {
            Ok(html) => {
                info!(
                    clicks = log.clicks.len(),
                    scrolls = log.scroll_count,
                    pages = log.visited_pages.len(),
                    "interactive render captured {} chars",
                    html.len()
                );
                (Some(html), log)
            }
            Err(e) => {
                warn!("interactive render failed: {e}");
                log.failures.push(StepFailure {
                    step: "render".to_string(),
                    reason: e.to_string(),
                });
                (None, log)
            }
        }
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ── Click snippets ───────────────────────────────────────────────────────────
// Values are embedded as JSON string literals (JSON is a subset of JS), so
// arbitrary phrases and selectors cannot break out of the script.

fn click_script(target: &ClickTarget) -> String {
    match target {
        ClickTarget::Css(selector) => format!(
            r#"(() => {{
                const el = document.querySelector({selector});
                if (el) {{ el.click(); return true; }}
                return false;
            }})()"#,
            selector = js_string(selector)
        ),
        ClickTarget::ButtonText(phrase) => text_click_script("button", phrase),
        ClickTarget::AnchorText(phrase) => text_click_script("a", phrase),
    }
}

fn text_click_script(tag: &str, phrase: &str) -> String {
    format!(
        r#"(() => {{
            const phrase = {phrase};
            const el = Array.from(document.querySelectorAll({tag}))
                .find(e => (e.textContent || '').toLowerCase().includes(phrase));
            if (el) {{ el.click(); return true; }}
            return false;
        }})()"#,
        phrase = js_string(&phrase.to_lowercase()),
        tag = js_string(tag),
    )
}

fn next_page_script() -> String {
    r#"(() => {
        const lower = s => (s || '').toLowerCase();
        let el = Array.from(document.querySelectorAll('a[aria-label], button[aria-label]'))
            .find(e => lower(e.getAttribute('aria-label')).includes('next'));
        if (!el) {
            el = Array.from(document.querySelectorAll('a, button'))
                .find(e => lower(e.textContent).includes('next'));
        }
        if (el) { el.click(); return true; }
        return false;
    })()"#
        .to_string()
}

/// Encode a value as a JS string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_click_script_embeds_selector_as_literal() {
        let script = click_script(&ClickTarget::Css("[role=\"tab\"]".to_string()));
        assert!(script.contains(r#"document.querySelector("[role=\"tab\"]")"#));
        assert!(script.contains("el.click()"));
    }

    #[test]
    fn text_click_script_lowercases_the_phrase() {
        let script = click_script(&ClickTarget::ButtonText("Load More".to_string()));
        assert!(script.contains("\"load more\""));
        assert!(script.contains("querySelectorAll(\"button\")"));
    }

    #[test]
    fn hostile_phrase_cannot_escape_the_literal() {
        let script = click_script(&ClickTarget::AnchorText("\"); alert(1); (\"".to_string()));
        // The phrase must stay inside one JSON-escaped literal.
        assert!(script.contains(r#""\"); alert(1); (\"""#));
    }

    #[test]
    fn pagination_prefers_aria_labels() {
        let script = next_page_script();
        let aria = script.find("a[aria-label], button[aria-label]").unwrap();
        let text = script.find("'a, button'").unwrap();
        assert!(aria < text);
    }
}
