//! End-to-end search and retrieval against mock backends and pages

use websearx::config::Settings;
use websearx::query::TimeRange;
use websearx::{BatchResult, WebSearch};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(primary: &str, secondary: &str) -> Settings {
    let mut settings = Settings::default();
    settings.search.primary_url = primary.to_string();
    settings.search.secondary_url = secondary.to_string();
    settings.outgoing.useragent = Some("websearx-test".to_string());
    settings
}

async fn mount_page(server: &MockServer, route: &str, content_type: &str, body: &[u8]) {
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", content_type))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_vec(), content_type))
        .mount(server)
        .await;
}

async fn mount_searxng_config(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/config"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(br#"{"engines": [{"name": "wikipedia"}]}"#.to_vec(), "application/json"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn searxng_results_with_full_content() {
    let pages = MockServer::start().await;
    mount_page(
        &pages,
        "/book/ch04",
        "text/html",
        b"<html><body><main><h1>Ownership</h1><p>Each value has an owner.</p></main></body></html>",
    )
    .await;
    mount_page(
        &pages,
        "/blog/borrowing",
        "text/html",
        b"<html><body><article><p>References borrow values.</p></article></body></html>",
    )
    .await;

    let searxng = MockServer::start().await;
    mount_searxng_config(&searxng).await;
    let results = serde_json::json!({
        "results": [
            {"url": format!("{}/book/ch04", pages.uri()), "title": "Ownership", "content": "Chapter 4"},
            {"url": format!("{}/blog/borrowing", pages.uri()), "title": "Borrowing", "content": "A blog post"},
            {"url": "https://unused.example", "title": "Third", "content": "cut by the limit"}
        ]
    });
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust ownership"))
        .and(query_param("format", "json"))
        .and(query_param("time_range", "year"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results))
        .expect(1)
        .mount(&searxng)
        .await;

    let ddg = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&ddg)
        .await;

    let service = WebSearch::from_settings(&settings(&searxng.uri(), &ddg.uri())).unwrap();
    let results = service
        .search("rust ownership", Some(TimeRange::Year), true, Some(2))
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Ownership");
    assert_eq!(results[0].snippet.as_deref(), Some("Chapter 4"));
    assert_eq!(
        results[0].full_content.as_deref(),
        Some("Ownership\n\nEach value has an owner.")
    );
    assert_eq!(results[1].full_content.as_deref(), Some("References borrow values."));
}

#[tokio::test]
async fn failing_primary_falls_back_to_duckduckgo() {
    let searxng = MockServer::start().await;
    mount_searxng_config(&searxng).await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&searxng)
        .await;

    let ddg = MockServer::start().await;
    let html = r#"
        <html><body>
          <div class="result results_links">
            <h2><a class="result__a" href="https://doc.rust-lang.org/book/">The Rust Book</a></h2>
            <a class="result__snippet">Learn Rust</a>
          </div>
          <div class="result results_links">
            <h2><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=x">Rust</a></h2>
            <a class="result__snippet">A language empowering everyone</a>
          </div>
        </body></html>
    "#;
    Mock::given(method("POST"))
        .and(body_string_contains("df=d"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.as_bytes().to_vec(), "text/html"))
        .expect(1)
        .mount(&ddg)
        .await;

    let service = WebSearch::from_settings(&settings(&searxng.uri(), &ddg.uri())).unwrap();
    let results = service
        .search("rust", Some(TimeRange::Day), false, None)
        .await
        .unwrap();

    let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://doc.rust-lang.org/book/", "https://www.rust-lang.org/"]);
    assert!(results.iter().all(|r| r.full_content.is_none()));
}

#[tokio::test]
async fn both_backends_down_yield_no_results() {
    let service =
        WebSearch::from_settings(&settings("http://127.0.0.1:9", "http://127.0.0.1:9/html/")).unwrap();
    let results = service.search("rust", None, false, None).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn url_content_keeps_positions() {
    let pages = MockServer::start().await;
    mount_page(
        &pages,
        "/one",
        "text/html",
        b"<html><body><p>First document</p></body></html>",
    )
    .await;
    mount_page(
        &pages,
        "/two",
        "text/plain",
        b"<html><body><p>Second document</p></body></html>",
    )
    .await;

    let service =
        WebSearch::from_settings(&settings("http://127.0.0.1:9", "http://127.0.0.1:9/html/")).unwrap();
    let urls = vec![format!("{}/one", pages.uri()), format!("{}/two", pages.uri())];
    let content = service.get_url_content(&urls).await.unwrap();

    assert_eq!(
        serde_json::to_value(&content).unwrap(),
        serde_json::json!({"0": "First document", "1": "Second document"})
    );

    let single = service.get_url_content(&urls[..1]).await.unwrap();
    assert_eq!(single, BatchResult::Single("First document".to_string()));
}
