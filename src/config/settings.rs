//! Settings structures for websearx configuration

use crate::error::Error;
use crate::search::BackendKind;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the primary (SearXNG) backend
pub const DEFAULT_PRIMARY_URL: &str = "http://127.0.0.1:8080";

/// Default location of the secondary (DuckDuckGo HTML) backend
pub const DEFAULT_SECONDARY_URL: &str = "https://html.duckduckgo.com/html/";

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub search: SearchSettings,
    pub outgoing: OutgoingSettings,
    pub retrieval: RetrievalSettings,
    pub server: ServerSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        let timeouts = [
            ("search.availability_timeout", self.search.availability_timeout),
            ("outgoing.request_timeout", self.outgoing.request_timeout),
            ("outgoing.probe_timeout", self.outgoing.probe_timeout),
            ("outgoing.fetch_timeout", self.outgoing.fetch_timeout),
            ("outgoing.render_timeout", self.outgoing.render_timeout),
        ];
        for (name, secs) in timeouts {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a positive number of seconds, got {}",
                    name, secs
                )));
            }
        }
        if self.retrieval.concurrency == 0 {
            return Err(Error::Config("retrieval.concurrency must be at least 1".to_string()));
        }
        if self.search.primary_url.trim().is_empty() || self.search.secondary_url.trim().is_empty() {
            return Err(Error::Config("backend URLs must not be empty".to_string()));
        }
        Ok(())
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("SEARXNG_HOST") {
            if !val.trim().is_empty() {
                self.search.primary_url = val.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(val) = std::env::var("WEBSEARX_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("WEBSEARX_PREFERRED_BACKEND") {
            if let Some(kind) = BackendKind::parse(&val) {
                self.search.preferred_backend = kind;
            }
        }
        if let Ok(val) = std::env::var("WEBSEARX_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("WEBSEARX_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
    }
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
}

/// Search backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Base URL of the SearXNG instance
    pub primary_url: String,
    /// DuckDuckGo HTML endpoint
    pub secondary_url: String,
    /// Backend tried first
    pub preferred_backend: BackendKind,
    /// Result limit when the caller gives none
    pub default_max_results: usize,
    /// Timeout of the primary availability check in seconds
    pub availability_timeout: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            primary_url: DEFAULT_PRIMARY_URL.to_string(),
            secondary_url: DEFAULT_SECONDARY_URL.to_string(),
            preferred_backend: BackendKind::Primary,
            default_max_results: crate::DEFAULT_MAX_RESULTS,
            availability_timeout: 2.0,
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Timeout for search backend requests in seconds
    pub request_timeout: f64,
    /// Timeout for the HEAD metadata probe in seconds
    pub probe_timeout: f64,
    /// Timeout for page and document downloads in seconds
    pub fetch_timeout: f64,
    /// Timeout for one browser navigation in seconds
    pub render_timeout: f64,
    /// Fixed user agent (none = random desktop browser)
    pub useragent: Option<String>,
    /// Pool max size
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: 10.0,
            probe_timeout: 10.0,
            fetch_timeout: 30.0,
            render_timeout: 20.0,
            useragent: None,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Content retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// How many resources of a batch are probed at the same time
    pub concurrency: usize,
    /// Lowercase phrases marking a page that only works with scripting
    pub js_shell_markers: Vec<String>,
    /// Maximum characters of extracted text per resource
    pub max_chars: usize,
    /// Chromium/Chrome executable (none = auto-detect)
    pub browser_executable: Option<String>,
    /// Run the browser inside its sandbox (disable in containers running as root)
    pub browser_sandbox: bool,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            js_shell_markers: vec![
                "enable javascript".to_string(),
                "javascript to run this app".to_string(),
            ],
            max_chars: 100_000,
            browser_executable: None,
            browser_sandbox: true,
        }
    }
}

/// Tool server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8888,
            bind_address: "127.0.0.1".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.search.primary_url, DEFAULT_PRIMARY_URL);
        assert_eq!(settings.search.preferred_backend, BackendKind::Primary);
        assert_eq!(settings.search.default_max_results, 5);
        assert!(settings.outgoing.probe_timeout < settings.outgoing.fetch_timeout);
        assert_eq!(settings.server.port, 8888);
    }

    #[test]
    fn test_validation() {
        assert!(Settings::default().validate().is_ok());

        let mut settings = Settings::default();
        settings.outgoing.render_timeout = -1.0;
        assert!(matches!(settings.validate(), Err(Error::Config(_))));

        let mut settings = Settings::default();
        settings.retrieval.concurrency = 0;
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
search:
  primary_url: "http://searx.internal:8080"
  preferred_backend: secondary
retrieval:
  concurrency: 2
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.search.primary_url, "http://searx.internal:8080");
        assert_eq!(settings.search.preferred_backend, BackendKind::Secondary);
        assert_eq!(settings.search.secondary_url, DEFAULT_SECONDARY_URL);
        assert_eq!(settings.retrieval.concurrency, 2);
        assert_eq!(settings.retrieval.js_shell_markers.len(), 2);
        assert_eq!(settings.outgoing.render_timeout, 20.0);
    }
}
