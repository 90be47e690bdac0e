//! Backend selection with one-shot failover

use super::models::{BackendKind, SearchRequest};
use crate::engines::SearchBackend;
use crate::error::{Error, Result};
use crate::results::{normalize_records, SearchResult};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of backend switches one logical search may perform
pub const FAILOVER_BUDGET: u8 = 1;

/// Chooses between the primary and secondary backend for each request
///
/// The selector holds no per-request state: the failover budget travels as an
/// argument, so concurrent and consecutive searches never influence each
/// other.
pub struct BackendSelector {
    primary: Arc<dyn SearchBackend>,
    secondary: Arc<dyn SearchBackend>,
}

impl BackendSelector {
    pub fn new(primary: Arc<dyn SearchBackend>, secondary: Arc<dyn SearchBackend>) -> Self {
        Self { primary, secondary }
    }

    fn backend(&self, kind: BackendKind) -> &Arc<dyn SearchBackend> {
        match kind {
            BackendKind::Primary => &self.primary,
            BackendKind::Secondary => &self.secondary,
        }
    }

    /// Search, failing over at most once; both backends failing yields an empty list
    pub async fn search(&self, request: &SearchRequest) -> Vec<SearchResult> {
        let preferred = request.backend();
        let primary_available = match preferred {
            BackendKind::Primary => self.primary.is_available().await,
            BackendKind::Secondary => true,
        };
        let start = BackendKind::resolve(preferred, primary_available);

        // An unreachable primary already counts as the preferred backend failing
        let budget = if start == preferred {
            FAILOVER_BUDGET
        } else {
            info!(
                "Primary backend {} unavailable, using {}",
                self.primary.name(),
                self.secondary.name()
            );
            FAILOVER_BUDGET - 1
        };

        self.search_with_budget(start, request, budget).await
    }

    fn search_with_budget<'a>(
        &'a self,
        kind: BackendKind,
        request: &'a SearchRequest,
        budget: u8,
    ) -> BoxFuture<'a, Vec<SearchResult>> {
        async move {
            match self.attempt(kind, request).await {
                Ok(results) => results,
                Err(e) if budget > 0 => {
                    let next = kind.other();
                    warn!("{}; retrying with {}", e, self.backend(next).name());
                    self.search_with_budget(next, request, budget - 1).await
                }
                Err(e) => {
                    warn!("{}; no backend left to try", e);
                    Vec::new()
                }
            }
        }
        .boxed()
    }

    async fn attempt(&self, kind: BackendKind, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let backend = self.backend(kind);
        debug!("Searching '{}' with {}", request.query(), backend.name());

        let mut results = normalize_records(backend.search(request).await?);
        if results.is_empty() {
            return Err(Error::backend(backend.name(), "no results"));
        }

        results.truncate(request.max_results());
        Ok(results)
    }
}
