//! HTTP networking module
//!
//! Provides the HTTP client used for search backends, probes and downloads.

mod client;
mod user_agent;

pub use client::HttpClient;
pub use user_agent::{accept_json, generate_user_agent};
