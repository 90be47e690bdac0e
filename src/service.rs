//! User-facing operations: search with optional full content, and URL retrieval

use crate::config::Settings;
use crate::engines::{DuckDuckGo, HttpBackend, SearchBackend, Searxng};
use crate::error::{Error, Result};
use crate::network::HttpClient;
use crate::query::TimeRange;
use crate::results::SearchResult;
use crate::retrieval::{
    BatchAggregator, BatchResult, ChromiumRenderer, HtmlTextExtractor, PdfTextExtractor,
    RenderEscalation, RetrievalProbe, TieredExtractor,
};
use crate::search::{BackendKind, BackendSelector, SearchRequest};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Search and retrieval facade shared by the CLI and the tool server
pub struct WebSearch {
    selector: BackendSelector,
    aggregator: BatchAggregator,
    preferred_backend: BackendKind,
    default_max_results: usize,
}

impl WebSearch {
    pub fn new(selector: BackendSelector, aggregator: BatchAggregator) -> Self {
        Self {
            selector,
            aggregator,
            preferred_backend: BackendKind::Primary,
            default_max_results: crate::DEFAULT_MAX_RESULTS,
        }
    }

    /// Wire the real backends, extractors and browser from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let client = HttpClient::with_settings(&settings.outgoing)?;
        let request_timeout = Duration::from_secs_f64(settings.outgoing.request_timeout);
        let availability_timeout = Duration::from_secs_f64(settings.search.availability_timeout);

        let primary: Arc<dyn SearchBackend> = Arc::new(
            HttpBackend::new(
                Arc::new(Searxng::new(settings.search.primary_url.clone())),
                client.clone(),
            )
            .with_timeout(request_timeout)
            .with_availability_timeout(availability_timeout),
        );
        let secondary: Arc<dyn SearchBackend> = Arc::new(
            HttpBackend::new(
                Arc::new(DuckDuckGo::new(settings.search.secondary_url.clone())),
                client.clone(),
            )
            .with_timeout(request_timeout),
        );
        let selector = BackendSelector::new(primary, secondary);

        let html = Arc::new(HtmlTextExtractor::new(settings.retrieval.max_chars));
        let probe = RetrievalProbe::from_settings(client.clone(), html.clone(), settings);
        let renderer = Arc::new(ChromiumRenderer::from_settings(settings, client.user_agent()));
        let tiered = TieredExtractor::new(probe, client, Arc::new(PdfTextExtractor), settings);
        let escalation = RenderEscalation::new(
            renderer,
            html,
            Duration::from_secs_f64(settings.outgoing.render_timeout),
        );
        let aggregator =
            BatchAggregator::new(tiered, escalation, settings.retrieval.concurrency);

        info!(
            "Search backends: primary {} and secondary {}, preferring {}",
            settings.search.primary_url,
            settings.search.secondary_url,
            settings.search.preferred_backend
        );

        Ok(Self {
            selector,
            aggregator,
            preferred_backend: settings.search.preferred_backend,
            default_max_results: settings.search.default_max_results,
        })
    }

    /// Search and optionally attach the full text of every result
    ///
    /// Backend failures never surface as errors: with both backends down the
    /// result is an empty list. Only a blank query is rejected.
    pub async fn search(
        &self,
        query: &str,
        time_range: Option<TimeRange>,
        full_content: bool,
        max_results: Option<usize>,
    ) -> Result<Vec<SearchResult>> {
        let request = SearchRequest::new(query)?
            .with_time_range(time_range)
            .with_max_results(max_results.unwrap_or(self.default_max_results))
            .with_backend(self.preferred_backend);
        self.search_request(&request, full_content).await
    }

    pub async fn search_request(
        &self,
        request: &SearchRequest,
        full_content: bool,
    ) -> Result<Vec<SearchResult>> {
        let mut results = self.selector.search(request).await;
        if !full_content || results.is_empty() {
            return Ok(results);
        }

        let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
        let contents = self.aggregator.retrieve(&urls).await;
        for (position, result) in results.iter_mut().enumerate() {
            match contents.get(position) {
                Some(text) if !text.is_empty() => result.full_content = Some(text.to_string()),
                _ => debug!("No full content for {}", result.url),
            }
        }
        Ok(results)
    }

    /// Retrieve the text of one or more URLs
    pub async fn get_url_content(&self, urls: &[String]) -> Result<BatchResult> {
        if urls.is_empty() {
            return Err(Error::InvalidRequest("at least one URL is required".to_string()));
        }
        Ok(self.aggregator.retrieve(urls).await)
    }
}
