//! Result type definitions

use serde::{Deserialize, Serialize};

/// A single search result as handed to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The URL of the result
    pub url: String,
    /// The title of the result
    pub title: String,
    /// Short snippet from the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Extracted page text, only present when full content was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
}

impl SearchResult {
    /// Create a new result
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: None,
            full_content: None,
        }
    }
}

/// A result record as a backend produced it, before field aliasing
///
/// SearXNG answers with `url`/`content`, DuckDuckGo-style records carry
/// `href`/`body`; either shape deserializes into this struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub url: Option<String>,
    pub href: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub content: Option<String>,
    pub snippet: Option<String>,
}

impl RawRecord {
    /// Normalize into a [`SearchResult`]
    ///
    /// `href` wins over `url`, and the snippet comes from `body`, then
    /// `content`, then `snippet`. Records without any usable link are dropped.
    pub fn normalize(self) -> Option<SearchResult> {
        let url = non_blank(self.href).or_else(|| non_blank(self.url))?;
        let snippet = non_blank(self.body)
            .or_else(|| non_blank(self.content))
            .or_else(|| non_blank(self.snippet));

        Some(SearchResult {
            url,
            title: self.title.map(|t| t.trim().to_string()).unwrap_or_default(),
            snippet,
            full_content: None,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize a batch of raw records, keeping backend order
pub fn normalize_records(records: Vec<RawRecord>) -> Vec<SearchResult> {
    records.into_iter().filter_map(RawRecord::normalize).collect()
}
