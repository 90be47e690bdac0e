//! websearx: resilient web search and content retrieval
//!
//! Searches go to a SearXNG instance first and fail over once to DuckDuckGo.
//! Content retrieval resolves each URL with the cheapest strategy that works:
//! static HTML text, PDF decoding, or a headless browser shared by the whole
//! batch.

pub mod config;
pub mod engines;
pub mod error;
pub mod network;
pub mod query;
pub mod results;
pub mod retrieval;
pub mod search;
pub mod service;
pub mod web;

pub use config::Settings;
pub use error::{Error, Result};
pub use results::SearchResult;
pub use retrieval::BatchResult;
pub use search::{BackendKind, SearchRequest};
pub use service::WebSearch;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result limit when none (or nonsense) is given
pub const DEFAULT_MAX_RESULTS: usize = 5;
