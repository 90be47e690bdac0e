//! Error types
//!
//! Only `InvalidRequest` ever reaches a caller of the search or retrieval
//! operations. Every other variant is recovered inside the pipeline, either by
//! switching backends or by escalating to the next extraction tier.

/// Errors produced while searching or retrieving content
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Caller input that can never succeed (empty query, no URLs)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A search backend was unreachable or answered with something unusable
    #[error("search backend {backend} failed: {reason}")]
    BackendFailure { backend: String, reason: String },

    /// Classifying a resource failed
    #[error("probe failed for {url}: {reason}")]
    ProbeFailure { url: String, reason: String },

    /// A cheap extraction tier could not produce text
    #[error("extraction failed: {0}")]
    ExtractionFailure(String),

    /// The browser could not be launched or could not render a page
    #[error("render failed: {0}")]
    RenderFailure(String),

    /// Transport-level HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid settings
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn backend(backend: impl Into<String>, reason: impl ToString) -> Self {
        Self::BackendFailure {
            backend: backend.into(),
            reason: reason.to_string(),
        }
    }

    pub fn probe(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::ProbeFailure {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
