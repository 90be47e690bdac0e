//! Search orchestration module
//!
//! Request model and the backend selector with its one-shot failover.

mod models;
mod selector;

pub use models::*;
pub use selector::{BackendSelector, FAILOVER_BUDGET};
