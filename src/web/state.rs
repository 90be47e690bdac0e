//! Application state shared across handlers

use crate::config::Settings;
use crate::service::WebSearch;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Search and retrieval facade
    pub service: Arc<WebSearch>,
}

impl AppState {
    /// Build state with the real backends and browser
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let service = WebSearch::from_settings(&settings)?;
        Ok(Self::with_service(settings, service))
    }

    /// Build state around an already wired facade
    pub fn with_service(settings: Settings, service: WebSearch) -> Self {
        Self {
            settings: Arc::new(settings),
            service: Arc::new(service),
        }
    }

    /// Result limit applied when a request gives none
    pub fn default_max_results(&self) -> usize {
        self.settings.search.default_max_results
    }
}
