mod metadata;
pub mod planner;
pub mod sections;

pub use planner::plan_click_targets;
pub use sections::{extract_sections, truncate_html, visible_text};

use crate::core::config::ScrapeConfig;
use crate::core::error::ScrapeError;
use crate::core::types::PageMeta;
use crate::scraping::browser_manager;
use reqwest::Client;
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Metadata and parse tree produced by one static-parse pass.
///
/// The tree is exclusively owned by the current request and confined to
/// synchronous scopes; it is never shared across requests or held across a
/// suspension point.
pub struct ParsedPage {
    pub title: String,
    pub description: String,
    pub language: String,
    pub canonical: Option<String>,
    /// Count of extracted visible characters, the thin-content signal.
    pub visible_text_length: usize,
    pub document: Html,
}

impl ParsedPage {
    pub fn meta(&self) -> PageMeta {
        PageMeta {
            title: self.title.clone(),
            description: self.description.clone(),
            language: self.language.clone(),
            canonical: self.canonical.clone(),
        }
    }
}

/// Static-fetch and parse front end of the pipeline.
pub struct PageExtractor {
    client: Client,
    config: Arc<ScrapeConfig>,
}

impl PageExtractor {
    pub fn new(client: Client, config: Arc<ScrapeConfig>) -> Self {
        Self { client, config }
    }

    /// One GET with redirect-following, a timeout, and a browser-like
    /// User-Agent. Non-success status codes are fetch failures.
    pub async fn fetch_static(&self, url: &str) -> Result<String, ScrapeError> {
        let timeout = Duration::from_secs(self.config.resolve_fetch_timeout_secs());

        let response = self
            .client
            .get(url)
            .header("User-Agent", browser_manager::random_user_agent())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ScrapeError::Fetch(format!("request failed: {e}")))?;

        let response = response
            .error_for_status()
            .map_err(|e| ScrapeError::Fetch(format!("bad status: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::Fetch(format!("body read failed: {e}")))?;

        info!(chars = body.len(), "static fetch succeeded");
        Ok(body)
    }

    /// Parse raw HTML into page metadata plus the owned parse tree.
    /// Every field is independently optional: absent markup yields an empty
    /// value, never an error.
    pub fn parse_static(&self, html: &str, base: &Url) -> ParsedPage {
        let document = Html::parse_document(html);
        ParsedPage {
            title: self.extract_title(&document),
            description: self.extract_description(&document),
            language: self.extract_language(&document),
            canonical: self.extract_canonical(&document, base),
            visible_text_length: self.visible_text_length(&document),
            document,
        }
    }
}

/// Decide whether the static result is too thin and a dynamic render is
/// required. Pure: no static page at all → always render; otherwise render
/// iff the visible text is below the threshold or the title is missing.
pub fn needs_dynamic_render(page: Option<&ParsedPage>, min_text_length: usize) -> bool {
    match page {
        None => true,
        Some(page) => page.visible_text_length < min_text_length || page.title.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> PageExtractor {
        PageExtractor::new(Client::new(), Arc::new(ScrapeConfig::default()))
    }

    fn page(title: &str, visible_text_length: usize) -> ParsedPage {
        ParsedPage {
            title: title.to_string(),
            description: String::new(),
            language: String::new(),
            canonical: None,
            visible_text_length,
            document: Html::parse_document("<html></html>"),
        }
    }

    #[test]
    fn thin_text_triggers_render() {
        assert!(needs_dynamic_render(Some(&page("T", 100)), 500));
    }

    #[test]
    fn missing_title_triggers_render() {
        assert!(needs_dynamic_render(Some(&page("", 1000)), 500));
    }

    #[test]
    fn rich_page_skips_render() {
        assert!(!needs_dynamic_render(Some(&page("T", 1000)), 500));
    }

    #[test]
    fn absent_page_always_renders() {
        assert!(needs_dynamic_render(None, 500));
    }

    #[test]
    fn threshold_is_a_parameter() {
        assert!(!needs_dynamic_render(Some(&page("T", 100)), 50));
        assert!(needs_dynamic_render(Some(&page("T", 100)), 101));
    }

    #[test]
    fn parse_static_fills_every_field() {
        let html = r#"<html lang="en-US"><head>
            <title> Example Page </title>
            <meta name="description" content="A page.">
            <link rel="canonical" href="/canonical">
            </head><body><p>Hello world</p></body></html>"#;
        let base = Url::parse("https://example.com/a/b").unwrap();
        let parsed = extractor().parse_static(html, &base);

        assert_eq!(parsed.title, "Example Page");
        assert_eq!(parsed.description, "A page.");
        assert_eq!(parsed.language, "en-US");
        assert_eq!(
            parsed.canonical.as_deref(),
            Some("https://example.com/canonical")
        );
        // Title text is document text; the meta description is only an attribute.
        assert_eq!(parsed.visible_text_length, "Example Page Hello world".len());
    }

    #[test]
    fn parse_static_tolerates_bare_markup() {
        let base = Url::parse("https://example.com").unwrap();
        let parsed = extractor().parse_static("<p>x</p>", &base);
        assert_eq!(parsed.title, "");
        assert_eq!(parsed.description, "");
        assert_eq!(parsed.language, "");
        assert_eq!(parsed.canonical, None);
    }
}
