//! Search engine module
//!
//! Defines the Engine trait, the two engines websearx can fail over between,
//! and the `SearchBackend` seam the selector dispatches through.

mod backend;
mod traits;

pub mod duckduckgo;
pub mod searxng;

pub use backend::{HttpBackend, SearchBackend};
pub use duckduckgo::DuckDuckGo;
pub use searxng::Searxng;
pub use traits::*;
