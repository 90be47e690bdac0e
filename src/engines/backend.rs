//! Search backends: one `search` entry point per strategy

use super::traits::{Engine, RequestParams};
use crate::error::{Error, Result};
use crate::network::HttpClient;
use crate::results::RawRecord;
use crate::search::SearchRequest;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A search provider the selector can dispatch to
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Run one search, returning the backend's raw records in rank order
    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawRecord>>;

    /// Whether the backend looks reachable; defaults to optimistic
    async fn is_available(&self) -> bool {
        true
    }
}

/// Backend driving an [`Engine`] over HTTP
pub struct HttpBackend {
    engine: Arc<dyn Engine>,
    client: HttpClient,
    timeout: Duration,
    availability_timeout: Duration,
}

impl HttpBackend {
    pub fn new(engine: Arc<dyn Engine>, client: HttpClient) -> Self {
        Self {
            engine,
            client,
            timeout: Duration::from_secs(10),
            availability_timeout: Duration::from_secs(2),
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set timeout of the availability check
    pub fn with_availability_timeout(mut self, timeout: Duration) -> Self {
        self.availability_timeout = timeout;
        self
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    fn name(&self) -> &str {
        self.engine.name()
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<RawRecord>> {
        let params = RequestParams {
            query: request.query().to_string(),
            time_range: request.time_range().filter(|_| self.engine.supports_time_range()),
        };

        let engine_request = self.engine.request(&params)?;
        let response = self
            .client
            .execute_with_timeout(engine_request, self.timeout)
            .await
            .map_err(|e| Error::backend(self.engine.name(), e))?;

        debug!(
            "Engine {} answered with HTTP {}",
            self.engine.name(),
            response.status
        );
        self.engine.response(response)
    }

    async fn is_available(&self) -> bool {
        let Some(check) = self.engine.health_check() else {
            return true;
        };

        match self
            .client
            .execute_with_timeout(check, self.availability_timeout)
            .await
        {
            Ok(response) => self.engine.is_healthy(&response),
            Err(e) => {
                debug!("Availability check for {} failed: {}", self.engine.name(), e);
                false
            }
        }
    }
}
