//! Render escalation: one browser session for every straggler of a batch

use super::extract::TextExtractor;
use crate::config::Settings;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Starts rendering sessions
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn RenderSession>>;
}

/// A live browser that renders pages one after another
#[async_trait]
pub trait RenderSession: Send {
    /// Navigate to `url`, wait for it to settle and return the rendered HTML
    async fn render(&mut self, url: &str) -> Result<String>;

    /// Tear the session down
    async fn close(&mut self) -> Result<()>;
}

/// Positions of a batch that only the browser can resolve
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderQueue {
    entries: BTreeMap<usize, String>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `url` for the given batch position
    pub fn push(&mut self, position: usize, url: impl Into<String>) {
        self.entries.insert(position, url.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }
}

impl IntoIterator for RenderQueue {
    type Item = (usize, String);
    type IntoIter = std::collections::btree_map::IntoIter<usize, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Resolves a [`RenderQueue`] in a single browser session
pub struct RenderEscalation {
    renderer: Arc<dyn Renderer>,
    extractor: Arc<dyn TextExtractor>,
    render_timeout: Duration,
}

impl RenderEscalation {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        extractor: Arc<dyn TextExtractor>,
        render_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            extractor,
            render_timeout,
        }
    }

    /// Render every queued URL, returning text by position
    ///
    /// Every queued position gets an entry; failures become empty strings. An
    /// empty queue never launches a browser.
    pub async fn resolve(&self, queue: RenderQueue) -> BTreeMap<usize, String> {
        if queue.is_empty() {
            return BTreeMap::new();
        }

        info!("Rendering {} page(s) in a headless browser", queue.len());
        let mut session = match self.renderer.launch().await {
            Ok(session) => session,
            Err(e) => {
                warn!("{}; {} page(s) left empty", e, queue.len());
                return queue.positions().map(|p| (p, String::new())).collect();
            }
        };

        let mut rendered = BTreeMap::new();
        for (position, url) in queue {
            let text = match timeout(self.render_timeout, session.render(&url)).await {
                Ok(Ok(html)) => self.extractor.extract(&html, Some(&url)).unwrap_or_default(),
                Ok(Err(e)) => {
                    warn!("Rendering {} failed: {}", url, e);
                    String::new()
                }
                Err(_) => {
                    warn!("Rendering {} timed out after {:?}", url, self.render_timeout);
                    String::new()
                }
            };
            rendered.insert(position, text);
        }

        if let Err(e) = session.close().await {
            warn!("Closing browser session failed: {}", e);
        }
        rendered
    }
}

/// Headless Chromium through the DevTools protocol
pub struct ChromiumRenderer {
    executable: Option<String>,
    sandbox: bool,
    user_agent: String,
    request_timeout: Duration,
}

impl ChromiumRenderer {
    pub fn from_settings(settings: &Settings, user_agent: impl Into<String>) -> Self {
        Self {
            executable: settings.retrieval.browser_executable.clone(),
            sandbox: settings.retrieval.browser_sandbox,
            user_agent: user_agent.into(),
            request_timeout: Duration::from_secs_f64(settings.outgoing.render_timeout),
        }
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn launch(&self) -> Result<Box<dyn RenderSession>> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", self.user_agent))
            .request_timeout(self.request_timeout);
        if let Some(ref executable) = self.executable {
            builder = builder.chrome_executable(executable);
        }
        if !self.sandbox {
            builder = builder.no_sandbox();
        }
        let config = builder
            .build()
            .map_err(|e| Error::RenderFailure(format!("browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::RenderFailure(format!("browser launch failed: {}", e)))?;

        // The handler drives the CDP connection and must be polled
        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });
        debug!("Headless browser launched");

        Ok(Box::new(ChromiumSession {
            browser,
            page: None,
            handler,
        }))
    }
}

struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler: JoinHandle<()>,
}

impl ChromiumSession {
    async fn page(&mut self) -> Result<Page> {
        if let Some(ref page) = self.page {
            return Ok(page.clone());
        }
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::RenderFailure(format!("new page failed: {}", e)))?;
        self.page = Some(page.clone());
        Ok(page)
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn render(&mut self, url: &str) -> Result<String> {
        let page = self.page().await?;
        page.goto(url)
            .await
            .map_err(|e| Error::RenderFailure(format!("navigation to {} failed: {}", url, e)))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| Error::RenderFailure(format!("{} never settled: {}", url, e)))?;
        page.content()
            .await
            .map_err(|e| Error::RenderFailure(format!("snapshot of {} failed: {}", url, e)))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            let _ = page.close().await;
        }
        let result = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| Error::RenderFailure(format!("browser close failed: {}", e)));
        let _ = self.browser.wait().await;
        self.handler.abort();
        result
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        // Browser's own drop kills the child process; stop polling its socket
        self.handler.abort();
    }
}
