//! Search request and backend selection models

use crate::error::{Error, Result};
use crate::query::TimeRange;
use serde::{Deserialize, Serialize};

/// Which of the two interchangeable backends to use
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// The configured SearXNG instance
    #[default]
    Primary,
    /// DuckDuckGo
    Secondary,
}

impl BackendKind {
    /// The backend to fail over to
    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }

    /// Resolve the backend to start with
    ///
    /// Preferring the primary only sticks when the primary is reachable.
    pub fn resolve(preferred: Self, primary_available: bool) -> Self {
        match preferred {
            Self::Primary if primary_available => Self::Primary,
            _ => Self::Secondary,
        }
    }

    /// Parse a backend name (`primary`/`searxng`, `secondary`/`ddgs`/`duckduckgo`)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "primary" | "searxng" => Some(Self::Primary),
            "secondary" | "ddgs" | "duckduckgo" => Some(Self::Secondary),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable search request
///
/// Construction validates the query, so a `SearchRequest` in hand is always
/// searchable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    query: String,
    time_range: Option<TimeRange>,
    max_results: usize,
    backend: BackendKind,
}

impl SearchRequest {
    /// Create a request with default limit and the primary backend preferred
    ///
    /// Fails with [`Error::InvalidRequest`] when the query is blank.
    pub fn new(query: impl Into<String>) -> Result<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(Error::InvalidRequest("query must not be empty".to_string()));
        }

        Ok(Self {
            query: query.trim().to_string(),
            time_range: None,
            max_results: crate::DEFAULT_MAX_RESULTS,
            backend: BackendKind::Primary,
        })
    }

    /// Set time range
    pub fn with_time_range(mut self, time_range: Option<TimeRange>) -> Self {
        self.time_range = time_range;
        self
    }

    /// Set result limit; zero falls back to the default
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = if max_results == 0 {
            crate::DEFAULT_MAX_RESULTS
        } else {
            max_results
        };
        self
    }

    /// Set preferred backend
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn time_range(&self) -> Option<TimeRange> {
        self.time_range
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }
}
