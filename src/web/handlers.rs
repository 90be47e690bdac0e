//! HTTP request handlers

use super::state::AppState;
use crate::error::Error;
use crate::query::{clean_urls, normalize_time_range, parse_flag, parse_max_results, parse_url_list};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

/// Query parameters for search, all taken as text and parsed leniently
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub time_range: Option<String>,
    pub full_content: Option<String>,
    pub max_results: Option<String>,
}

/// Query parameters for GET /scrape
#[derive(Debug, Deserialize)]
pub struct ScrapeParams {
    pub urls: Option<String>,
}

/// Body of POST /scrape
#[derive(Debug, Deserialize)]
pub struct ScrapeBody {
    pub urls: UrlsInput,
}

/// One URL (possibly a serialized list) or a proper list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UrlsInput {
    One(String),
    Many(Vec<String>),
}

impl UrlsInput {
    fn into_urls(self) -> Vec<String> {
        match self {
            UrlsInput::One(raw) => parse_url_list(&raw),
            UrlsInput::Many(urls) => clean_urls(urls),
        }
    }
}

fn error_response(status: StatusCode, message: impl ToString) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.to_string() })),
    )
        .into_response()
}

fn from_error(error: Error) -> Response {
    match error {
        Error::InvalidRequest(_) => error_response(StatusCode::BAD_REQUEST, error),
        other => {
            tracing::error!("Request failed: {}", other);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, other)
        }
    }
}

/// Search handler
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let query = match params.q {
        Some(q) if !q.trim().is_empty() => q,
        _ => return error_response(StatusCode::BAD_REQUEST, "missing query parameter 'q'"),
    };

    let time_range = normalize_time_range(params.time_range.as_deref());
    let full_content = parse_flag(params.full_content.as_deref());
    let max_results = parse_max_results(params.max_results.as_deref(), state.default_max_results());

    match state
        .service
        .search(&query, time_range, full_content, Some(max_results))
        .await
    {
        Ok(results) => Json(results).into_response(),
        Err(e) => from_error(e),
    }
}

async fn scrape(state: AppState, urls: Vec<String>) -> Response {
    if urls.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "at least one URL is required");
    }
    match state.service.get_url_content(&urls).await {
        Ok(content) => Json(content).into_response(),
        Err(e) => from_error(e),
    }
}

/// GET /scrape?urls=...
pub async fn scrape_query(
    State(state): State<AppState>,
    Query(params): Query<ScrapeParams>,
) -> Response {
    let urls = params
        .urls
        .as_deref()
        .map(parse_url_list)
        .unwrap_or_default();
    scrape(state, urls).await
}

/// POST /scrape with `{"urls": ...}`
pub async fn scrape_body(State(state): State<AppState>, Json(body): Json<ScrapeBody>) -> Response {
    scrape(state, body.urls.into_urls()).await
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}
