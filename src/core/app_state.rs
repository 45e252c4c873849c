use crate::core::config::{self, ScrapeConfig};
use crate::scraping::renderer::CdpRenderer;
use crate::scraping::DynamicRenderer;
use std::env;
use std::sync::Arc;

/// Shared per-process state. Nothing here is request-scoped: each scrape
/// owns its parse trees and its browser session exclusively, so handlers
/// only share the client, the config, and the outbound-concurrency gate.
#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    pub config: Arc<ScrapeConfig>,
    // Concurrency control for external calls (fetches + browser sessions)
    pub outbound_limit: Arc<tokio::sync::Semaphore>,
    /// Browser-automation boundary; tests substitute a canned implementation.
    pub renderer: Arc<dyn DynamicRenderer>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("outbound_permits", &self.outbound_limit.available_permits())
            .finish()
    }
}

impl AppState {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self::with_config(http_client, Arc::new(config::load_config()))
    }

    pub fn with_config(http_client: reqwest::Client, config: Arc<ScrapeConfig>) -> Self {
        let outbound_limit = env::var("OUTBOUND_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(16);

        let renderer: Arc<dyn DynamicRenderer> =
            Arc::new(CdpRenderer::new(Arc::clone(&config)));
        Self {
            http_client,
            config,
            outbound_limit: Arc::new(tokio::sync::Semaphore::new(outbound_limit)),
            renderer,
        }
    }

    /// Builder: substitute the browser boundary.
    pub fn with_renderer(mut self, renderer: Arc<dyn DynamicRenderer>) -> Self {
        self.renderer = renderer;
        self
    }
}
