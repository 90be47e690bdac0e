//! Search results module
//!
//! Canonical result type and the normalization of raw backend records.

mod types;

pub use types::*;
