//! Section extraction and classification.
//!
//! Takes a parsed document, strips noise elements, partitions the remainder
//! into semantic sections, classifies and labels each one, and copies out a
//! size-bounded content summary per section. Works on arbitrary markup; a
//! page with no recognizable structure still yields one section.

use crate::core::error::ScrapeError;
use crate::core::types::{ImageItem, LinkItem, Section, SectionContent, SectionType};
use crate::core::urls::make_absolute_url;
use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use url::Url;

const RAW_HTML_CAP: usize = 50_000;
const TRUNCATION_SUFFIX: &str = "... [truncated]";
const TEXT_CAP: usize = 5_000;
const LINKS_CAP: usize = 100;
const IMAGES_CAP: usize = 50;
const LISTS_CAP: usize = 20;
const TABLES_CAP: usize = 10;
const SYNTHETIC_TEXT_CAP: usize = 1_000;

const SEMANTIC_SELECTOR: &str = "section, article, main, header, footer, nav, aside";
const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";

fn selector(input: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(input).map_err(|e| ScrapeError::Parse(format!("bad selector `{input}`: {e}")))
}

// ── Noise filtering ──────────────────────────────────────────────────────────

/// Remove noise elements (cookie banners, modals, overlays) from the tree.
///
/// An element is noise when its `id` or `class` contains one of the
/// configured patterns (case-insensitive substring), when it carries
/// `role="dialog"`, or when its `aria-label` contains "close"/"dismiss".
/// Removal is structural: the subtree is gone for all later processing.
pub fn filter_noise(document: &mut Html, patterns: &[String]) -> Result<usize, ScrapeError> {
    let mut rules = Vec::new();
    for pattern in patterns {
        let escaped = pattern.replace('\\', "\\\\").replace('"', "\\\"");
        rules.push(format!("[id*=\"{escaped}\" i]"));
        rules.push(format!("[class*=\"{escaped}\" i]"));
    }
    rules.push("[role=\"dialog\"]".to_string());
    rules.push("[aria-label*=\"close\" i]".to_string());
    rules.push("[aria-label*=\"dismiss\" i]".to_string());

    let mut doomed = Vec::new();
    for rule in &rules {
        let sel = selector(rule)?;
        doomed.extend(document.select(&sel).map(|element| element.id()));
    }

    let removed = doomed.len();
    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
    if removed > 0 {
        debug!(removed, "noise elements filtered");
    }
    Ok(removed)
}

// ── Sectioning ───────────────────────────────────────────────────────────────

/// Partition the document into classified, labeled sections.
///
/// Noise is filtered once up front. The scan claims every semantic element
/// ({section, article, main, header, footer, nav, aside}) in document
/// order; with zero hits the whole `<body>` becomes one section, and with
/// no body at all a synthetic section over the full document is emitted.
pub fn extract_sections(
    document: &mut Html,
    base: &Url,
    noise_patterns: &[String],
) -> Result<Vec<Section>, ScrapeError> {
    filter_noise(document, noise_patterns)?;

    let semantic = selector(SEMANTIC_SELECTOR)?;
    let mut claimed = HashSet::new();
    let ids: Vec<NodeId> = document
        .select(&semantic)
        .map(|element| element.id())
        .filter(|id| claimed.insert(*id))
        .collect();

    let mut ordinals: HashMap<SectionType, usize> = HashMap::new();
    let mut sections = Vec::new();
    for id in ids {
        if let Some(section) = build_section(document, id, base, &mut ordinals, None)? {
            sections.push(section);
        }
    }

    if sections.is_empty() {
        let body = selector("body")?;
        let body_id = document.select(&body).next().map(|element| element.id());
        if let Some(id) = body_id {
            let preset = Some(("Main Content", SectionType::Section));
            if let Some(section) = build_section(document, id, base, &mut ordinals, preset)? {
                sections.push(section);
            }
        }
    }

    if sections.is_empty() {
        sections.push(synthetic_document_section(document, base));
    }

    Ok(sections)
}

fn build_section(
    document: &mut Html,
    id: NodeId,
    base: &Url,
    ordinals: &mut HashMap<SectionType, usize>,
    preset: Option<(&str, SectionType)>,
) -> Result<Option<Section>, ScrapeError> {
    strip_scripts(document, id);

    let Some(node) = document.tree.get(id) else {
        return Ok(None);
    };
    let Some(element) = ElementRef::wrap(node) else {
        return Ok(None);
    };

    let (kind, label) = match preset {
        Some((label, kind)) => (kind, label.to_string()),
        None => {
            let kind = determine_section_type(element);
            (kind, generate_section_label(element, kind)?)
        }
    };

    let content = extract_content(element, base)?;
    let serialized = element.html();
    let truncated = serialized.chars().count() > RAW_HTML_CAP;

    let ordinal = ordinals.entry(kind).or_insert(0);
    let section = Section {
        id: format!("{}-{}", kind.as_str(), ordinal),
        kind,
        label,
        source_url: base.to_string(),
        content,
        raw_html: truncate_html(&serialized, RAW_HTML_CAP),
        truncated,
    };
    *ordinal += 1;
    Ok(Some(section))
}

/// Detach every `<script>`/`<style>` inside the subtree rooted at `root`.
fn strip_scripts(document: &mut Html, root: NodeId) {
    let Some(node) = document.tree.get(root) else {
        return;
    };
    let doomed: Vec<NodeId> = node
        .descendants()
        .filter(|n| {
            matches!(n.value(), Node::Element(e) if e.name() == "script" || e.name() == "style")
        })
        .map(|n| n.id())
        .collect();
    for id in doomed {
        if let Some(mut n) = document.tree.get_mut(id) {
            n.detach();
        }
    }
}

fn synthetic_document_section(document: &Html, base: &Url) -> Section {
    let text: String = visible_text(document.root_element())
        .chars()
        .take(SYNTHETIC_TEXT_CAP)
        .collect();
    let serialized = document.root_element().html();
    Section {
        id: format!("{}-0", SectionType::Unknown.as_str()),
        kind: SectionType::Unknown,
        label: "Content".to_string(),
        source_url: base.to_string(),
        content: SectionContent {
            text,
            ..SectionContent::default()
        },
        truncated: serialized.chars().count() > RAW_HTML_CAP,
        raw_html: truncate_html(&serialized, RAW_HTML_CAP),
    }
}

// ── Classification & labeling ────────────────────────────────────────────────

/// Classify a section element. First match wins: tag name rules, then
/// substring hints in the combined class + id string.
pub fn determine_section_type(element: ElementRef<'_>) -> SectionType {
    let tag = element.value().name();

    match tag {
        "nav" => return SectionType::Nav,
        "footer" => return SectionType::Footer,
        "header" => {
            let classes = element.value().attr("class").unwrap_or("").to_lowercase();
            return if classes.contains("hero") {
                SectionType::Hero
            } else {
                SectionType::Section
            };
        }
        _ => {}
    }

    let classes = element.value().attr("class").unwrap_or("").to_lowercase();
    let id = element.value().attr("id").unwrap_or("").to_lowercase();
    let combined = format!("{classes} {id}");

    if combined.contains("hero") {
        SectionType::Hero
    } else if combined.contains("faq") {
        SectionType::Faq
    } else if combined.contains("pricing") {
        SectionType::Pricing
    } else if combined.contains("list") || tag == "ul" || tag == "ol" {
        SectionType::List
    } else if combined.contains("grid") {
        SectionType::Grid
    } else {
        SectionType::Section
    }
}

/// Human-readable label: first heading text inside the section, else the
/// `aria-label`, else the title-cased type name. Never empty.
pub fn generate_section_label(
    element: ElementRef<'_>,
    kind: SectionType,
) -> Result<String, ScrapeError> {
    let headings = selector(HEADING_SELECTOR)?;
    if let Some(heading) = element.select(&headings).next() {
        let text = heading.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            return Ok(text);
        }
    }

    if let Some(aria) = element.value().attr("aria-label") {
        let aria = aria.trim();
        if !aria.is_empty() {
            return Ok(aria.to_string());
        }
    }

    Ok(kind.fallback_label())
}

// ── Content extraction ───────────────────────────────────────────────────────

/// Copy a bounded content summary out of a section subtree. Script/style
/// subtrees must already be stripped; everything returned is a plain value
/// with no ties to the tree.
pub fn extract_content(element: ElementRef<'_>, base: &Url) -> Result<SectionContent, ScrapeError> {
    let heading_sel = selector(HEADING_SELECTOR)?;
    let headings: Vec<String> = element
        .select(&heading_sel)
        .map(|h| h.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let mut text = visible_text(element);
    if text.chars().count() > TEXT_CAP {
        text = text.chars().take(TEXT_CAP).collect();
    }

    let link_sel = selector("a[href]")?;
    let mut links = Vec::new();
    for anchor in element.select(&link_sel) {
        if links.len() >= LINKS_CAP {
            break;
        }
        let href = make_absolute_url(base, anchor.value().attr("href").unwrap_or(""));
        if href.is_empty() {
            continue;
        }
        links.push(LinkItem {
            text: anchor.text().collect::<String>().trim().to_string(),
            href,
        });
    }

    let image_sel = selector("img[src]")?;
    let mut images = Vec::new();
    for img in element.select(&image_sel) {
        if images.len() >= IMAGES_CAP {
            break;
        }
        let src = make_absolute_url(base, img.value().attr("src").unwrap_or(""));
        if src.is_empty() {
            continue;
        }
        images.push(ImageItem {
            src,
            alt: img.value().attr("alt").unwrap_or("").to_string(),
        });
    }

    // Every list in the subtree is its own entry; nested lists are visited
    // independently. Items come from direct <li> children only.
    let list_sel = selector("ul, ol")?;
    let mut lists = Vec::new();
    for list in element.select(&list_sel) {
        if lists.len() >= LISTS_CAP {
            break;
        }
        let items: Vec<String> = list
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
            .map(visible_text)
            .filter(|t| !t.is_empty())
            .collect();
        if !items.is_empty() {
            lists.push(items);
        }
    }

    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td, th")?;
    let mut tables = Vec::new();
    for table in element.select(&table_sel) {
        if tables.len() >= TABLES_CAP {
            break;
        }
        let mut rows = Vec::new();
        for row in table.select(&row_sel) {
            let cells: Vec<String> = row
                .select(&cell_sel)
                .map(visible_text)
                .filter(|t| !t.is_empty())
                .collect();
            if !cells.is_empty() {
                rows.push(cells);
            }
        }
        if !rows.is_empty() {
            tables.push(rows);
        }
    }

    Ok(SectionContent {
        headings,
        text,
        links,
        images,
        lists,
        tables,
    })
}

// ── Text & truncation helpers ────────────────────────────────────────────────

/// Whitespace-normalized visible text of a subtree: word tokens joined by
/// single spaces, script/style content excluded.
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut tokens = Vec::new();
    collect_visible_tokens(*element, &mut tokens);
    tokens.join(" ")
}

fn collect_visible_tokens(node: NodeRef<'_, Node>, tokens: &mut Vec<String>) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                tokens.extend(text.text.split_whitespace().map(str::to_string));
            }
            Node::Element(element) => {
                if element.name() == "script" || element.name() == "style" {
                    continue;
                }
                collect_visible_tokens(child, tokens);
            }
            _ => {}
        }
    }
}

/// Cap serialized markup at `max_chars` characters, appending a marker when
/// anything was cut.
pub fn truncate_html(html: &str, max_chars: usize) -> String {
    if html.chars().count() <= max_chars {
        return html.to_string();
    }
    let mut truncated: String = html.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_SUFFIX);
    truncated
}
