//! Tiered extraction: cheapest applicable strategy first

use super::extract::{truncate_chars, DocumentTextExtractor};
use super::probe::{Classification, RetrievalProbe};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::network::HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// What the cheap tiers made of one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    /// Text is available now
    Resolved(String),
    /// Only the render pass can produce text for this URL
    Deferred(String),
}

/// Runs the probe and the static/document tiers for single resources
pub struct TieredExtractor {
    probe: RetrievalProbe,
    client: HttpClient,
    documents: Arc<dyn DocumentTextExtractor>,
    fetch_timeout: Duration,
    max_chars: usize,
}

impl TieredExtractor {
    pub fn new(
        probe: RetrievalProbe,
        client: HttpClient,
        documents: Arc<dyn DocumentTextExtractor>,
        settings: &Settings,
    ) -> Self {
        Self {
            probe,
            client,
            documents,
            fetch_timeout: Duration::from_secs_f64(settings.outgoing.fetch_timeout),
            max_chars: settings.retrieval.max_chars,
        }
    }

    /// Produce an outcome for one URL; never fails
    pub async fn retrieve(&self, url: &str) -> RetrievalOutcome {
        match self.probe.classify(url).await {
            Classification::StructuredText(text) => {
                RetrievalOutcome::Resolved(text.trim().to_string())
            }
            Classification::Document => match self.extract_document(url).await {
                Ok(text) => RetrievalOutcome::Resolved(text),
                Err(e) => {
                    warn!("Document extraction failed for {}: {}", url, e);
                    RetrievalOutcome::Deferred(url.to_string())
                }
            },
            Classification::NeedsRendering => RetrievalOutcome::Deferred(url.to_string()),
        }
    }

    async fn extract_document(&self, url: &str) -> Result<String> {
        let bytes = self.client.get_bytes(url, self.fetch_timeout).await?;
        debug!("Downloaded {} bytes from {}", bytes.len(), url);

        // Decoding is CPU bound and some decoders panic on hostile input
        let documents = self.documents.clone();
        let text = tokio::task::spawn_blocking(move || documents.extract(&bytes))
            .await
            .map_err(|e| Error::ExtractionFailure(format!("document decoder aborted: {}", e)))??;

        let text = text.trim();
        if text.is_empty() {
            return Err(Error::ExtractionFailure("document has no text layer".to_string()));
        }
        Ok(truncate_chars(text, self.max_chars))
    }
}
