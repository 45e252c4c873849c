use super::sections::visible_text;
use super::PageExtractor;
use crate::core::urls::make_absolute_url;
use scraper::{Html, Selector};
use url::Url;

impl PageExtractor {
    /// Text of the first `<title>` element, empty when absent.
    pub(super) fn extract_title(&self, document: &Html) -> String {
        if let Ok(selector) = Selector::parse("title") {
            if let Some(element) = document.select(&selector).next() {
                return element.text().collect::<String>().trim().to_string();
            }
        }
        String::new()
    }

    /// `content` of `<meta name="description">`, else of
    /// `<meta property="og:description">`. The first element present wins,
    /// even if its `content` attribute is missing.
    pub(super) fn extract_description(&self, document: &Html) -> String {
        for sel in [
            "meta[name=\"description\"]",
            "meta[property=\"og:description\"]",
        ] {
            if let Ok(selector) = Selector::parse(sel) {
                if let Some(element) = document.select(&selector).next() {
                    return element
                        .value()
                        .attr("content")
                        .unwrap_or("")
                        .trim()
                        .to_string();
                }
            }
        }
        String::new()
    }

    /// `lang` attribute of the root `<html>` element.
    pub(super) fn extract_language(&self, document: &Html) -> String {
        if let Ok(selector) = Selector::parse("html") {
            if let Some(element) = document.select(&selector).next() {
                if let Some(lang) = element.value().attr("lang") {
                    return lang.trim().to_string();
                }
            }
        }
        String::new()
    }

    /// `<link rel="canonical">` href, resolved against the page URL.
    pub(super) fn extract_canonical(&self, document: &Html, base: &Url) -> Option<String> {
        if let Ok(selector) = Selector::parse("link[rel=\"canonical\"]") {
            if let Some(element) = document.select(&selector).next() {
                if let Some(href) = element.value().attr("href") {
                    let resolved = make_absolute_url(base, href);
                    if !resolved.is_empty() {
                        return Some(resolved);
                    }
                }
            }
        }
        None
    }

    /// Character count of the document's visible text.
    pub(super) fn visible_text_length(&self, document: &Html) -> usize {
        visible_text(document.root_element()).chars().count()
    }
}
