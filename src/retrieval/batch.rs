//! Batch aggregation over the retrieval tiers

use super::render::{RenderEscalation, RenderQueue};
use super::tiered::{RetrievalOutcome, TieredExtractor};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Text for a batch of URLs
///
/// A single URL yields its text directly. Larger batches yield a map from
/// input position to text, serialized with string keys ("0", "1", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchResult {
    Single(String),
    Positional(BTreeMap<usize, String>),
}

impl BatchResult {
    /// Text at the given input position
    pub fn get(&self, position: usize) -> Option<&str> {
        match self {
            BatchResult::Single(text) if position == 0 => Some(text),
            BatchResult::Single(_) => None,
            BatchResult::Positional(map) => map.get(&position).map(String::as_str),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            BatchResult::Single(_) => 1,
            BatchResult::Positional(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs the cheap tiers over a batch, then one render pass for the rest
pub struct BatchAggregator {
    tiered: TieredExtractor,
    escalation: RenderEscalation,
    concurrency: usize,
}

impl BatchAggregator {
    pub fn new(tiered: TieredExtractor, escalation: RenderEscalation, concurrency: usize) -> Self {
        Self {
            tiered,
            escalation,
            concurrency: concurrency.max(1),
        }
    }

    /// Retrieve text for every URL, keyed by input position
    pub async fn retrieve(&self, urls: &[String]) -> BatchResult {
        let mut texts: Vec<Option<String>> = vec![None; urls.len()];
        let mut queue = RenderQueue::new();

        let pending: Vec<_> = urls.iter().map(|url| self.tiered.retrieve(url)).collect();
        let outcomes: Vec<RetrievalOutcome> = stream::iter(pending)
            .buffered(self.concurrency)
            .collect()
            .await;

        for (position, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                RetrievalOutcome::Resolved(text) => texts[position] = Some(text),
                RetrievalOutcome::Deferred(url) => queue.push(position, url),
            }
        }
        debug!(
            "{} of {} resource(s) need rendering",
            queue.len(),
            urls.len()
        );

        for (position, text) in self.escalation.resolve(queue).await {
            texts[position] = Some(text);
        }

        let mut by_position: BTreeMap<usize, String> = texts
            .into_iter()
            .enumerate()
            .map(|(position, text)| (position, text.unwrap_or_default()))
            .collect();
        info!("Retrieved content for {} resource(s)", by_position.len());

        if urls.len() == 1 {
            return BatchResult::Single(by_position.remove(&0).unwrap_or_default());
        }
        BatchResult::Positional(by_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::error::{Error, Result};
    use crate::network::HttpClient;
    use crate::retrieval::{
        DocumentTextExtractor, HtmlTextExtractor, RenderSession, Renderer, RetrievalProbe,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StubPdf;

    impl DocumentTextExtractor for StubPdf {
        fn extract(&self, _bytes: &[u8]) -> Result<String> {
            Ok("Chapter 4: Understanding Ownership".to_string())
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        launches: AtomicUsize,
        renders: Arc<AtomicUsize>,
    }

    struct CountingSession {
        renders: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Renderer for CountingRenderer {
        async fn launch(&self) -> Result<Box<dyn RenderSession>> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(CountingSession {
                renders: self.renders.clone(),
            }))
        }
    }

    #[async_trait]
    impl RenderSession for CountingSession {
        async fn render(&mut self, url: &str) -> Result<String> {
            self.renders.fetch_add(1, Ordering::SeqCst);
            if url.contains("unreachable") {
                return Err(Error::RenderFailure("net::ERR_CONNECTION_REFUSED".into()));
            }
            Ok("<html><body><main><p>Dashboard loaded</p></main></body></html>".to_string())
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn aggregator(renderer: Arc<CountingRenderer>) -> BatchAggregator {
        let settings = Settings::default();
        let client = HttpClient::new().unwrap();
        let html = Arc::new(HtmlTextExtractor::default());
        let probe = RetrievalProbe::from_settings(client.clone(), html.clone(), &settings);
        let tiered = TieredExtractor::new(probe, client, Arc::new(StubPdf), &settings);
        let escalation = RenderEscalation::new(renderer, html, Duration::from_secs(5));
        BatchAggregator::new(tiered, escalation, 4)
    }

    async fn mount(server: &MockServer, route: &str, content_type: &str, body: &str) {
        Mock::given(method("HEAD"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", content_type))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), content_type))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_document_and_js_app_in_one_batch() {
        let server = MockServer::start().await;
        mount(&server, "/book.pdf", "application/pdf", "%PDF-1.7").await;
        mount(
            &server,
            "/app",
            "text/html",
            "<html><body><p>Please enable JavaScript to use the dashboard.</p></body></html>",
        )
        .await;

        let renderer = Arc::new(CountingRenderer::default());
        let urls = vec![
            format!("{}/book.pdf", server.uri()),
            format!("{}/app", server.uri()),
        ];
        let result = aggregator(renderer.clone()).retrieve(&urls).await;

        let expected: BTreeMap<usize, String> = [
            (0, "Chapter 4: Understanding Ownership".to_string()),
            (1, "Dashboard loaded".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(result, BatchResult::Positional(expected));
        assert_eq!(renderer.launches.load(Ordering::SeqCst), 1);
        assert_eq!(renderer.renders.load(Ordering::SeqCst), 1);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["0"], "Chapter 4: Understanding Ownership");
        assert_eq!(json["1"], "Dashboard loaded");
    }

    #[tokio::test]
    async fn test_single_static_page_is_a_bare_string() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/post",
            "text/html",
            "<html><body><article><p>Traits define shared behavior.</p></article></body></html>",
        )
        .await;

        let renderer = Arc::new(CountingRenderer::default());
        let result = aggregator(renderer.clone())
            .retrieve(&[format!("{}/post", server.uri())])
            .await;

        assert_eq!(result, BatchResult::Single("Traits define shared behavior.".to_string()));
        assert_eq!(serde_json::to_value(&result).unwrap(), "Traits define shared behavior.");
        assert_eq!(renderer.launches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_rendered_page_is_a_bare_string() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/app",
            "text/html",
            "<html><body><p>Please enable JavaScript to use the dashboard.</p></body></html>",
        )
        .await;

        let renderer = Arc::new(CountingRenderer::default());
        let result = aggregator(renderer.clone())
            .retrieve(&[format!("{}/app", server.uri())])
            .await;

        assert_eq!(result, BatchResult::Single("Dashboard loaded".to_string()));
        assert_eq!(renderer.launches.load(Ordering::SeqCst), 1);
        assert_eq!(renderer.renders.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_every_position_is_present() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/a",
            "text/html",
            "<html><body><p>First page</p></body></html>",
        )
        .await;

        let renderer = Arc::new(CountingRenderer::default());
        let urls = vec![
            "http://127.0.0.1:9/unreachable".to_string(),
            format!("{}/a", server.uri()),
            "http://127.0.0.1:9/unreachable-too".to_string(),
        ];
        let result = aggregator(renderer.clone()).retrieve(&urls).await;

        assert_eq!(result.len(), 3);
        assert_eq!(result.get(0), Some(""));
        assert_eq!(result.get(1), Some("First page"));
        assert_eq!(result.get(2), Some(""));
        assert_eq!(renderer.launches.load(Ordering::SeqCst), 1);
        assert_eq!(renderer.renders.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_single_failure_is_an_empty_string() {
        let renderer = Arc::new(CountingRenderer::default());
        let result = aggregator(renderer)
            .retrieve(&["http://127.0.0.1:9/unreachable".to_string()])
            .await;
        assert_eq!(result, BatchResult::Single(String::new()));
    }
}
