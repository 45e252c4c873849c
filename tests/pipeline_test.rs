//! End-to-end pipeline tests: a local mock HTTP server stands in for the
//! web, and a canned renderer stands in for the browser boundary.

use async_trait::async_trait;
use pagesift::config::ScrapeConfig;
use pagesift::pipeline;
use pagesift::types::*;
use pagesift::{AppState, ClickTarget, DynamicRenderer, ScrapeError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Initialize logging for tests
fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

/// Canned browser boundary. Records every invocation so tests can assert
/// whether (and with what plan) the pipeline escalated to a render.
struct StubRenderer {
    interactive_html: Option<String>,
    interactive_log: InteractionLog,
    plain_html: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubRenderer {
    fn new() -> Self {
        Self {
            interactive_html: None,
            interactive_log: InteractionLog::default(),
            plain_html: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl DynamicRenderer for StubRenderer {
    async fn render(&self, _url: &str, _timeout: Duration) -> Result<String, ScrapeError> {
        self.calls.lock().unwrap().push("plain".to_string());
        self.plain_html
            .clone()
            .ok_or_else(|| ScrapeError::Render("stub plain render failed".to_string()))
    }

    async fn render_with_interactions(
        &self,
        _url: &str,
        _scroll_depth: u32,
        targets: &[ClickTarget],
    ) -> (Option<String>, InteractionLog) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("interactive:{}", targets.len()));
        (self.interactive_html.clone(), self.interactive_log.clone())
    }
}

fn test_state(renderer: StubRenderer) -> Arc<AppState> {
    let state = AppState::with_config(
        reqwest::Client::new(),
        Arc::new(ScrapeConfig::default()),
    );
    Arc::new(state.with_renderer(Arc::new(renderer)))
}

fn rich_page(title: &str) -> String {
    let filler = "content ".repeat(100);
    format!(
        r#"<html lang="en"><head>
            <title>{title}</title>
            <meta name="description" content="Fixture page">
        </head><body>
            <nav><a href="/home">Home</a></nav>
            <header class="hero"><h1>Big Launch</h1></header>
            <div><p>{filler}</p></div>
        </body></html>"#
    )
}

fn thin_page(extra_body: &str) -> String {
    format!(
        r#"<html><head><title>Thin</title></head>
        <body><p>almost nothing here</p>{extra_body}</body></html>"#
    )
}

async fn serve(body: String) -> (MockServer, Url) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
    (server, url)
}

#[tokio::test]
async fn rich_static_page_needs_no_render() {
    init_logger();
    let (_server, url) = serve(rich_page("Rich")).await;

    let renderer = StubRenderer::new();
    let calls = Arc::clone(&renderer.calls);
    let state = test_state(renderer);

    let result = pipeline::scrape_page(&state, &url).await;

    assert!(calls.lock().unwrap().is_empty(), "renderer must stay idle");
    assert!(result.errors.is_empty());
    assert_eq!(result.meta.title, "Rich");
    assert_eq!(result.meta.description, "Fixture page");
    assert_eq!(result.meta.language, "en");

    let ids: Vec<&str> = result.sections.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["nav-0", "hero-0"]);
    assert_eq!(result.sections[1].label, "Big Launch");

    assert_eq!(result.interactions.scroll_count, 0);
    assert!(result.interactions.clicks.is_empty());
    assert!(result.scraped_at.ends_with('Z'));
}

#[tokio::test]
async fn thin_page_falls_back_to_interactive_render() {
    init_logger();
    let (_server, url) = serve(thin_page("")).await;

    let mut renderer = StubRenderer::new();
    renderer.interactive_html = Some(rich_page("Rendered"));
    renderer.interactive_log = InteractionLog {
        clicks: vec![ClickRecord {
            selector: "button:has-text(\"load more\")".to_string(),
            timestamp: None,
        }],
        scroll_count: 3,
        visited_pages: vec![],
        failures: vec![],
    };
    let calls = Arc::clone(&renderer.calls);
    let state = test_state(renderer);

    let result = pipeline::scrape_page(&state, &url).await;

    assert_eq!(calls.lock().unwrap().as_slice(), ["interactive:0"]);
    assert!(result.errors.is_empty());
    // Metadata comes from the re-parsed rendered document.
    assert_eq!(result.meta.title, "Rendered");
    assert_eq!(result.interactions.scroll_count, 3);
    assert_eq!(result.interactions.clicks.len(), 1);

    let kinds: Vec<SectionType> = result.sections.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SectionType::Nav, SectionType::Hero]);
}

#[tokio::test]
async fn missing_title_triggers_render() {
    init_logger();
    let filler = "words ".repeat(200);
    let (_server, url) = serve(format!("<html><body><p>{filler}</p></body></html>")).await;

    let mut renderer = StubRenderer::new();
    renderer.interactive_html = Some(rich_page("Titled After Render"));
    let calls = Arc::clone(&renderer.calls);
    let state = test_state(renderer);

    let result = pipeline::scrape_page(&state, &url).await;

    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(result.meta.title, "Titled After Render");
}

#[tokio::test]
async fn click_plan_is_threaded_to_the_renderer() {
    init_logger();
    let controls = r#"<button>Load more reviews</button><div role="tab">Specs</div>"#;
    let (_server, url) = serve(thin_page(controls)).await;

    let mut renderer = StubRenderer::new();
    renderer.interactive_html = Some(rich_page("Rendered"));
    let calls = Arc::clone(&renderer.calls);
    let state = test_state(renderer);

    let _ = pipeline::scrape_page(&state, &url).await;

    // One tab target plus one button-text target.
    assert_eq!(calls.lock().unwrap().as_slice(), ["interactive:2"]);
}

#[tokio::test]
async fn fetch_failure_degrades_to_plain_render() {
    init_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let url = Url::parse(&format!("{}/page", server.uri())).unwrap();

    let mut renderer = StubRenderer::new();
    renderer.plain_html = Some(rich_page("Recovered"));
    let calls = Arc::clone(&renderer.calls);
    let state = test_state(renderer);

    let result = pipeline::scrape_page(&state, &url).await;

    assert_eq!(
        calls.lock().unwrap().as_slice(),
        ["interactive:0", "plain"]
    );
    let phases: Vec<Phase> = result.errors.iter().map(|e| e.phase).collect();
    assert_eq!(phases, vec![Phase::Fetch, Phase::Render]);
    // Partial failure still produced a full extraction.
    assert_eq!(result.meta.title, "Recovered");
    assert_eq!(result.sections.len(), 2);
}

#[tokio::test]
async fn total_failure_still_yields_a_placeholder_section() {
    init_logger();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let url = Url::parse(&format!("{}/page", server.uri())).unwrap();

    let state = test_state(StubRenderer::new());
    let result = pipeline::scrape_page(&state, &url).await;

    let phases: Vec<Phase> = result.errors.iter().map(|e| e.phase).collect();
    assert_eq!(phases, vec![Phase::Fetch, Phase::Render, Phase::Render]);

    assert_eq!(result.sections.len(), 1);
    let placeholder = &result.sections[0];
    assert_eq!(placeholder.id, "unknown-0");
    assert_eq!(placeholder.kind, SectionType::Unknown);
    assert_eq!(placeholder.label, "Content");
    assert_eq!(placeholder.raw_html, "<div>No content extracted</div>");
    assert!(!placeholder.truncated);
}
