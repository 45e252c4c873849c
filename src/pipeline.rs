//! Per-request scrape orchestration.
//!
//! One request runs the stages in a fixed order: static fetch → static
//! parse + thin-content decision → interactive browser render (plain render
//! as a last resort) → re-parse → section extraction. Every stage catches
//! its own failures and converts them into phase-tagged error entries; the
//! response is always well-formed and always carries at least one section.

use crate::core::error::ScrapeError;
use crate::core::types::{
    InteractionLog, PageMeta, PhaseError, ScrapeResult, Section, SectionContent, SectionType,
};
use crate::core::AppState;
use crate::scraping::extractor::{
    extract_sections, needs_dynamic_render, plan_click_targets, PageExtractor,
};
use crate::scraping::ClickTarget;
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

pub async fn scrape_page(state: &Arc<AppState>, url: &Url) -> ScrapeResult {
    let _permit = state
        .outbound_limit
        .acquire()
        .await
        .expect("semaphore closed");

    let request_id = Uuid::new_v4();
    info!(%request_id, url = %url, "scrape started");

    let config = &state.config;
    let extractor = PageExtractor::new(state.http_client.clone(), Arc::clone(config));
    let mut errors: Vec<PhaseError> = Vec::new();

    // Stage 1: static fetch.
    let static_html = match extractor.fetch_static(url.as_str()).await {
        Ok(html) => Some(html),
        Err(e) => {
            warn!(%request_id, "static fetch failed: {e}");
            errors.push(e.to_phase_error());
            None
        }
    };

    // Stage 2: static parse and the fallback decision. The parse tree stays
    // inside this block.
    let min_text = config.resolve_min_text_length();
    let (use_render, targets): (bool, Vec<ClickTarget>) = match static_html.as_deref() {
        Some(html) => {
            let page = extractor.parse_static(html, url);
            let use_render = needs_dynamic_render(Some(&page), min_text);
            let targets = if use_render {
                plan_click_targets(&page.document, &config.resolve_click_phrases())
            } else {
                Vec::new()
            };
            (use_render, targets)
        }
        None => (needs_dynamic_render(None, min_text), Vec::new()),
    };

    // Stage 3: dynamic render when the static result is too thin.
    let mut interactions = InteractionLog::default();
    let mut final_html = static_html;
    if use_render {
        info!(%request_id, candidates = targets.len(), "dynamic render required");
        let (rendered, log) = state
            .renderer
            .render_with_interactions(url.as_str(), config.resolve_scroll_depth(), &targets)
            .await;
        interactions = log;

        match rendered {
            Some(html) => final_html = Some(html),
            None => {
                errors.push(
                    ScrapeError::Render("interactive render produced no document".to_string())
                        .to_phase_error(),
                );
                let timeout = Duration::from_millis(config.resolve_navigation_timeout_ms());
                match state.renderer.render(url.as_str(), timeout).await {
                    Ok(html) => final_html = Some(html),
                    Err(e) => {
                        warn!(%request_id, "plain render failed: {e}");
                        errors.push(e.to_phase_error());
                    }
                }
            }
        }
    }

    // Stage 4: re-parse the final markup and extract sections.
    let mut meta = PageMeta::default();
    let mut sections: Vec<Section> = Vec::new();
    if let Some(html) = final_html.as_deref() {
        let mut page = extractor.parse_static(html, url);
        meta = page.meta();
        match extract_sections(&mut page.document, url, &config.resolve_noise_patterns()) {
            Ok(extracted) => sections = extracted,
            Err(e) => {
                warn!(%request_id, "section extraction failed: {e}");
                errors.push(e.to_phase_error());
            }
        }
    }

    // A response always carries at least one section.
    if sections.is_empty() {
        sections.push(placeholder_section(url, &meta));
    }

    info!(
        %request_id,
        sections = sections.len(),
        errors = errors.len(),
        "scrape finished"
    );

    ScrapeResult {
        url: url.to_string(),
        scraped_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        meta,
        sections,
        interactions,
        errors,
    }
}

/// Minimal stand-in section emitted when every extraction attempt came up
/// empty, so the response stays well-formed.
fn placeholder_section(url: &Url, meta: &PageMeta) -> Section {
    Section {
        id: format!("{}-0", SectionType::Unknown.as_str()),
        kind: SectionType::Unknown,
        label: "Content".to_string(),
        source_url: url.to_string(),
        content: SectionContent {
            text: meta.title.clone(),
            ..SectionContent::default()
        },
        raw_html: "<div>No content extracted</div>".to_string(),
        truncated: false,
    }
}
