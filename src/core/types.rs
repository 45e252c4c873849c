use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

/// Top-level envelope returned by the `/scrape` endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeEnvelope {
    pub result: ScrapeResult,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScrapeResult {
    pub url: String,
    #[serde(rename = "scrapedAt")]
    pub scraped_at: String,
    pub meta: PageMeta,
    pub sections: Vec<Section>,
    pub interactions: InteractionLog,
    pub errors: Vec<PhaseError>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub language: String,
    pub canonical: Option<String>,
}

/// Pipeline stage that produced an error entry.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Fetch,
    Render,
    Parse,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PhaseError {
    pub message: String,
    pub phase: Phase,
}

/// Classified kind of an extracted page section.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Hero,
    Nav,
    Footer,
    Faq,
    Pricing,
    List,
    Grid,
    Section,
    Unknown,
}

impl SectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Hero => "hero",
            SectionType::Nav => "nav",
            SectionType::Footer => "footer",
            SectionType::Faq => "faq",
            SectionType::Pricing => "pricing",
            SectionType::List => "list",
            SectionType::Grid => "grid",
            SectionType::Section => "section",
            SectionType::Unknown => "unknown",
        }
    }

    /// Title-cased type name, used as the last-resort section label.
    pub fn fallback_label(&self) -> String {
        self.as_str()
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A classified, labeled, size-bounded excerpt of a page. All content is
/// copied out as plain values; nothing references the parse tree.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SectionType,
    pub label: String,
    #[serde(rename = "sourceUrl")]
    pub source_url: String,
    pub content: SectionContent,
    #[serde(rename = "rawHtml")]
    pub raw_html: String,
    pub truncated: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SectionContent {
    pub headings: Vec<String>,
    pub text: String,
    pub links: Vec<LinkItem>,
    pub images: Vec<ImageItem>,
    pub lists: Vec<Vec<String>>,
    pub tables: Vec<Vec<Vec<String>>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LinkItem {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ImageItem {
    pub src: String,
    pub alt: String,
}

/// Record of what the interaction driver actually did during one render.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct InteractionLog {
    pub clicks: Vec<ClickRecord>,
    #[serde(rename = "scrolls")]
    pub scroll_count: u32,
    /// Pagination trail, at most three entries.
    #[serde(rename = "pages")]
    pub visited_pages: Vec<String>,
    /// Per-step failures, recorded as data rather than swallowed. Omitted
    /// from serialized output when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<StepFailure>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ClickRecord {
    pub selector: String,
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StepFailure {
    pub step: String,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_type_wire_names_are_lowercase() {
        let json = serde_json::to_string(&SectionType::Hero).unwrap();
        assert_eq!(json, "\"hero\"");
        let json = serde_json::to_string(&SectionType::Unknown).unwrap();
        assert_eq!(json, "\"unknown\"");
    }

    #[test]
    fn fallback_label_is_title_cased() {
        assert_eq!(SectionType::Faq.fallback_label(), "Faq");
        assert_eq!(SectionType::Section.fallback_label(), "Section");
    }

    #[test]
    fn result_envelope_uses_camel_case_keys() {
        let result = ScrapeResult {
            url: "https://example.com/".to_string(),
            scraped_at: "2025-01-01T00:00:00.000Z".to_string(),
            meta: PageMeta::default(),
            sections: vec![Section {
                id: "nav-0".to_string(),
                kind: SectionType::Nav,
                label: "Main".to_string(),
                source_url: "https://example.com/".to_string(),
                content: SectionContent::default(),
                raw_html: "<nav></nav>".to_string(),
                truncated: false,
            }],
            interactions: InteractionLog::default(),
            errors: vec![PhaseError {
                message: "boom".to_string(),
                phase: Phase::Fetch,
            }],
        };
        let value = serde_json::to_value(&result).unwrap();

        assert!(value.get("scrapedAt").is_some());
        assert!(value["sections"][0].get("sourceUrl").is_some());
        assert!(value["sections"][0].get("rawHtml").is_some());
        assert_eq!(value["sections"][0]["type"], "nav");
        assert_eq!(value["errors"][0]["phase"], "fetch");
        assert!(value["interactions"].get("scrolls").is_some());
        assert!(value["interactions"].get("pages").is_some());
        // No failures recorded, so the log keeps its three-key shape.
        assert!(value["interactions"].get("failures").is_none());
    }
}
