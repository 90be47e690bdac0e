//! Engine traits and types

use crate::error::Result;
use crate::query::TimeRange;
use crate::results::RawRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters for building a search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestParams {
    /// Search query string
    pub query: String,
    /// Time range filter
    pub time_range: Option<TimeRange>,
}

impl RequestParams {
    /// Create new request parameters
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            time_range: None,
        }
    }

    /// Set time range
    pub fn with_time_range(mut self, time_range: Option<TimeRange>) -> Self {
        self.time_range = time_range;
        self
    }
}

/// HTTP request to be made by the engine
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// URL to request
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Query parameters
    pub params: HashMap<String, String>,
    /// Urlencoded POST body
    pub form: Option<HashMap<String, String>>,
}

impl EngineRequest {
    fn with_method(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HashMap::new(),
            params: HashMap::new(),
            form: None,
        }
    }

    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Get)
    }

    /// Create a HEAD request
    pub fn head(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Head)
    }

    /// Create a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::with_method(url, HttpMethod::Post)
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Send `fields` as an urlencoded body
    pub fn form(mut self, fields: HashMap<String, String>) -> Self {
        self.form = Some(fields);
        self
    }
}

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
}

/// HTTP response from an engine request or a probe
#[derive(Debug)]
pub struct EngineResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers, names lowercased
    pub headers: HashMap<String, String>,
    /// Response body as text
    pub text: String,
    /// Response URL (after redirects)
    pub url: String,
}

impl EngineResponse {
    /// Parse response as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.text)
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Declared content type, lowercased, empty when absent
    pub fn content_type(&self) -> String {
        self.headers
            .get("content-type")
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

/// A search engine speaking HTTP: builds a request, parses the response
///
/// Engines stay free of I/O so request building and response parsing can be
/// tested without a network.
pub trait Engine: Send + Sync {
    /// Engine name
    fn name(&self) -> &str;

    /// Whether this engine honours the time range filter
    fn supports_time_range(&self) -> bool {
        false
    }

    /// Build the HTTP request for a search
    fn request(&self, params: &RequestParams) -> Result<EngineRequest>;

    /// Parse the HTTP response into raw result records
    fn response(&self, response: EngineResponse) -> Result<Vec<RawRecord>>;

    /// Request telling whether the engine can serve searches at all
    fn health_check(&self) -> Option<EngineRequest> {
        None
    }

    /// Interpret the health check response
    fn is_healthy(&self, response: &EngineResponse) -> bool {
        response.is_success()
    }
}
