//! Tool server module
//!
//! JSON API exposing search and content retrieval to agents over HTTP.

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
