//! Retrieval probe: decide how a resource should be extracted

use super::extract::TextExtractor;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::network::HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// How a resource should be turned into text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// A binary document (PDF) to download and decode
    Document,
    /// A static page whose text was already extracted by the probe
    StructuredText(String),
    /// Only a browser can produce the text
    NeedsRendering,
}

/// Whether a declared content type is a binary document we can decode
pub fn is_document(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("pdf")
}

/// Whether extracted text looks like a page that only works with scripting
///
/// Case-insensitive substring match on the configured markers. This is a
/// heuristic: body copy that mentions enabling JavaScript also matches.
pub fn is_js_shell(text: &str, markers: &[String]) -> bool {
    let lower = text.to_lowercase();
    markers
        .iter()
        .any(|marker| lower.contains(&marker.to_lowercase()))
}

/// Classifies single resources using a HEAD probe and a static fetch
pub struct RetrievalProbe {
    client: HttpClient,
    extractor: Arc<dyn TextExtractor>,
    js_shell_markers: Vec<String>,
    probe_timeout: Duration,
    fetch_timeout: Duration,
}

impl RetrievalProbe {
    pub fn new(client: HttpClient, extractor: Arc<dyn TextExtractor>) -> Self {
        Self::from_settings(client, extractor, &Settings::default())
    }

    pub fn from_settings(
        client: HttpClient,
        extractor: Arc<dyn TextExtractor>,
        settings: &Settings,
    ) -> Self {
        Self {
            client,
            extractor,
            js_shell_markers: settings.retrieval.js_shell_markers.clone(),
            probe_timeout: Duration::from_secs_f64(settings.outgoing.probe_timeout),
            fetch_timeout: Duration::from_secs_f64(settings.outgoing.fetch_timeout),
        }
    }

    /// Classify a resource; any failure along the way means it needs rendering
    pub async fn classify(&self, url: &str) -> Classification {
        match self.try_classify(url).await {
            Ok(classification) => {
                debug!("Classified {} as {:?}", url, kind(&classification));
                classification
            }
            Err(e) => {
                debug!("{}; deferring to the browser", e);
                Classification::NeedsRendering
            }
        }
    }

    async fn try_classify(&self, url: &str) -> Result<Classification> {
        let head = self
            .client
            .head(url, self.probe_timeout)
            .await
            .map_err(|e| Error::probe(url, e))?;

        if is_document(&head.content_type()) {
            return Ok(Classification::Document);
        }

        let page = self
            .client
            .get(url, self.fetch_timeout)
            .await
            .map_err(|e| Error::probe(url, e))?;

        if !page.is_success() {
            return Err(Error::probe(url, format!("HTTP error: {}", page.status)));
        }
        // Servers that reject HEAD still declare the type on GET
        if is_document(&page.content_type()) {
            return Ok(Classification::Document);
        }

        match self.extractor.extract(&page.text, Some(url)) {
            Some(text) if !is_js_shell(&text, &self.js_shell_markers) => {
                Ok(Classification::StructuredText(text))
            }
            Some(_) => Ok(Classification::NeedsRendering),
            None => Err(Error::probe(url, "no extractable text")),
        }
    }
}

fn kind(classification: &Classification) -> &'static str {
    match classification {
        Classification::Document => "document",
        Classification::StructuredText(_) => "structured-text",
        Classification::NeedsRendering => "needs-rendering",
    }
}
