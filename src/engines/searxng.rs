//! SearXNG JSON API engine (primary backend)

use super::traits::*;
use crate::error::{Error, Result};
use crate::network::accept_json;
use crate::results::RawRecord;
use serde::Deserialize;

/// A SearXNG instance queried through its JSON output format
pub struct Searxng {
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    results: Vec<RawRecord>,
}

impl Searxng {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Engine for Searxng {
    fn name(&self) -> &str {
        "searxng"
    }

    fn supports_time_range(&self) -> bool {
        true
    }

    fn request(&self, params: &RequestParams) -> Result<EngineRequest> {
        let mut request = EngineRequest::get(format!("{}/search", self.base_url))
            .header("Accept", accept_json())
            .param("q", params.query.clone())
            .param("format", "json");

        if let Some(range) = params.time_range {
            request = request.param("time_range", range.as_str());
        }

        Ok(request)
    }

    fn response(&self, response: EngineResponse) -> Result<Vec<RawRecord>> {
        if !response.is_success() {
            return Err(Error::backend(
                self.name(),
                format!("HTTP error: {}", response.status),
            ));
        }

        let parsed: SearxngResponse = response
            .json()
            .map_err(|e| Error::backend(self.name(), format!("malformed response: {}", e)))?;

        Ok(parsed.results)
    }

    fn health_check(&self) -> Option<EngineRequest> {
        Some(EngineRequest::get(format!("{}/config", self.base_url)).header("Accept", accept_json()))
    }

    /// An instance is usable when `/config` answers and lists its engines
    fn is_healthy(&self, response: &EngineResponse) -> bool {
        response.is_success() && response.text.contains("engines")
    }
}
