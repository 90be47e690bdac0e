//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

/// Create the tool server router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(handlers::search))
        .route(
            "/scrape",
            get(handlers::scrape_query).post(handlers::scrape_body),
        )
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}
