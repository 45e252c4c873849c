// ---------------------------------------------------------------------------
// ScrapeConfig — file-based config loader (pagesift.json) with env-var fallback
// ---------------------------------------------------------------------------

/// Runtime tuning for the scrape pipeline, loaded from `pagesift.json`.
/// Every field is optional; resolution order is JSON field → env var →
/// built-in default.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ScrapeConfig {
    /// Visible-text character threshold below which a statically-fetched
    /// page is considered too thin and a browser render is triggered.
    pub min_text_length: Option<usize>,
    /// Timeout for the one static GET, in seconds.
    pub fetch_timeout_secs: Option<u64>,
    /// Overall browser navigation / quiescence budget, in milliseconds.
    pub navigation_timeout_ms: Option<u64>,
    /// Number of full-viewport downward scrolls during an interactive render.
    pub scroll_depth: Option<u32>,
    /// Settle delay after each scroll, in milliseconds.
    pub scroll_settle_ms: Option<u64>,
    /// Settle delay after each successful click, in milliseconds.
    pub click_settle_ms: Option<u64>,
    /// Maximum "next page" clicks to follow.
    pub max_pagination_clicks: Option<usize>,
    /// Substrings that mark an element's id/class as noise (cookie banners,
    /// modals, …). Matched case-insensitively.
    pub noise_patterns: Option<Vec<String>>,
    /// Button/link phrases worth clicking to reveal more content.
    pub click_phrases: Option<Vec<String>>,
}

impl ScrapeConfig {
    /// Threshold for the thin-content fallback decision. Default: 500.
    pub fn resolve_min_text_length(&self) -> usize {
        if let Some(n) = self.min_text_length {
            return n;
        }
        env_parse("PAGESIFT_MIN_TEXT_LENGTH").unwrap_or(500)
    }

    /// Static fetch timeout. Default: 10 s.
    pub fn resolve_fetch_timeout_secs(&self) -> u64 {
        if let Some(n) = self.fetch_timeout_secs {
            return n;
        }
        env_parse("PAGESIFT_FETCH_TIMEOUT_SECS").unwrap_or(10)
    }

    /// Navigation budget for browser renders. Default: 30 000 ms.
    pub fn resolve_navigation_timeout_ms(&self) -> u64 {
        if let Some(n) = self.navigation_timeout_ms {
            return n;
        }
        env_parse("PAGESIFT_NAVIGATION_TIMEOUT_MS").unwrap_or(30_000)
    }

    /// Scroll passes per interactive render. Default: 3.
    pub fn resolve_scroll_depth(&self) -> u32 {
        if let Some(n) = self.scroll_depth {
            return n;
        }
        env_parse("PAGESIFT_SCROLL_DEPTH").unwrap_or(3)
    }

    /// Post-scroll settle delay. Default: 1 000 ms.
    pub fn resolve_scroll_settle_ms(&self) -> u64 {
        if let Some(n) = self.scroll_settle_ms {
            return n;
        }
        env_parse("PAGESIFT_SCROLL_SETTLE_MS").unwrap_or(1_000)
    }

    /// Post-click settle delay. Default: 2 000 ms.
    pub fn resolve_click_settle_ms(&self) -> u64 {
        if let Some(n) = self.click_settle_ms {
            return n;
        }
        env_parse("PAGESIFT_CLICK_SETTLE_MS").unwrap_or(2_000)
    }

    /// Pagination depth. Default: 3.
    pub fn resolve_max_pagination_clicks(&self) -> usize {
        if let Some(n) = self.max_pagination_clicks {
            return n;
        }
        env_parse("PAGESIFT_MAX_PAGINATION_CLICKS").unwrap_or(3)
    }

    pub fn resolve_noise_patterns(&self) -> Vec<String> {
        if let Some(patterns) = &self.noise_patterns {
            return patterns.clone();
        }
        ["cookie", "banner", "modal", "popup", "newsletter"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn resolve_click_phrases(&self) -> Vec<String> {
        if let Some(phrases) = &self.click_phrases {
            return phrases.clone();
        }
        ["load more", "show more", "see more", "view more"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Load `pagesift.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `PAGESIFT_CONFIG` env var path
/// 2. `./pagesift.json`
/// 3. `../pagesift.json`
///
/// Missing file → `ScrapeConfig::default()` (silent, env-var fallbacks apply).
/// Parse error → log a warning, return `ScrapeConfig::default()`.
pub fn load_config() -> ScrapeConfig {
    let candidates: Vec<std::path::PathBuf> = {
        let mut v = vec![
            std::path::PathBuf::from("pagesift.json"),
            std::path::PathBuf::from("../pagesift.json"),
        ];
        if let Ok(env_path) = std::env::var("PAGESIFT_CONFIG") {
            v.insert(0, std::path::PathBuf::from(env_path));
        }
        v
    };

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<ScrapeConfig>(&contents) {
                Ok(cfg) => {
                    tracing::info!("pagesift.json loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        "pagesift.json parse error at {}: {} — using defaults",
                        path.display(),
                        e
                    );
                    return ScrapeConfig::default();
                }
            },
            Err(_) => continue, // file not found at this path — try next
        }
    }

    ScrapeConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_resolves_to_defaults() {
        let cfg = ScrapeConfig::default();
        assert_eq!(cfg.resolve_min_text_length(), 500);
        assert_eq!(cfg.resolve_fetch_timeout_secs(), 10);
        assert_eq!(cfg.resolve_navigation_timeout_ms(), 30_000);
        assert_eq!(cfg.resolve_scroll_depth(), 3);
        assert_eq!(cfg.resolve_max_pagination_clicks(), 3);
        assert_eq!(
            cfg.resolve_noise_patterns(),
            vec!["cookie", "banner", "modal", "popup", "newsletter"]
        );
        assert_eq!(
            cfg.resolve_click_phrases(),
            vec!["load more", "show more", "see more", "view more"]
        );
    }

    #[test]
    fn json_fields_win_over_defaults() {
        let cfg: ScrapeConfig = serde_json::from_str(
            r#"{"min_text_length": 42, "noise_patterns": ["consent"]}"#,
        )
        .unwrap();
        assert_eq!(cfg.resolve_min_text_length(), 42);
        assert_eq!(cfg.resolve_noise_patterns(), vec!["consent"]);
        // Untouched fields still resolve to defaults.
        assert_eq!(cfg.resolve_scroll_depth(), 3);
    }
}
