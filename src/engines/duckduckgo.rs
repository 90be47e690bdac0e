//! DuckDuckGo HTML engine (secondary backend)

use super::traits::*;
use crate::error::{Error, Result};
use crate::query::TimeRange;
use crate::results::RawRecord;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::collections::HashMap;
use url::Url;

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.result").expect("valid result selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__a").expect("valid title selector"));
static SNIPPET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result__snippet").expect("valid snippet selector"));
static CHALLENGE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".anomaly-modal, #challenge-form, form.challenge-form")
        .expect("valid challenge selector")
});

/// DuckDuckGo web search through the JavaScript-free HTML endpoint
pub struct DuckDuckGo {
    html_url: String,
}

impl DuckDuckGo {
    pub fn new(html_url: impl Into<String>) -> Self {
        Self {
            html_url: html_url.into(),
        }
    }

    fn parse_html_results(&self, document: &Html) -> Vec<RawRecord> {
        let mut records = Vec::new();

        for element in document.select(&RESULT_SELECTOR) {
            // Sponsored entries share the markup
            if element
                .value()
                .classes()
                .any(|c| c == "result--ad")
            {
                continue;
            }

            let Some(title_elem) = element.select(&TITLE_SELECTOR).next() else {
                continue;
            };

            let title = title_elem.text().collect::<String>().trim().to_string();
            if title.is_empty() {
                continue;
            }

            let Some(href) = title_elem.value().attr("href").and_then(resolve_link) else {
                continue;
            };

            let snippet = element
                .select(&SNIPPET_SELECTOR)
                .next()
                .map(|s| s.text().collect::<String>().trim().to_string());

            records.push(RawRecord {
                href: Some(href),
                title: Some(title),
                body: snippet,
                ..Default::default()
            });
        }

        records
    }
}

impl Default for DuckDuckGo {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SECONDARY_URL)
    }
}

/// Bot challenge served in place of results
///
/// Only the challenge markup counts. Result text that merely talks about
/// CAPTCHAs is a normal page.
fn is_challenge(document: &Html) -> bool {
    document.select(&CHALLENGE_SELECTOR).next().is_some()
        && document.select(&RESULT_SELECTOR).next().is_none()
}

/// Map a result link to its target URL
///
/// The HTML endpoint wraps targets as `//duckduckgo.com/l/?uddg=<encoded>`.
/// Internal links without a target are dropped.
fn resolve_link(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };
    let parsed = Url::parse(&absolute).ok()?;

    let is_ddg = parsed
        .host_str()
        .map(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"))
        .unwrap_or(false);
    if !is_ddg {
        return Some(absolute);
    }

    parsed
        .query_pairs()
        .find(|(k, _)| k == "uddg")
        .map(|(_, v)| v.into_owned())
        .filter(|target| target.starts_with("http"))
}

fn time_filter(range: TimeRange) -> &'static str {
    match range {
        TimeRange::Day => "d",
        TimeRange::Month => "m",
        TimeRange::Year => "y",
    }
}

impl Engine for DuckDuckGo {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    fn supports_time_range(&self) -> bool {
        true
    }

    fn request(&self, params: &RequestParams) -> Result<EngineRequest> {
        let mut form_data = HashMap::new();
        form_data.insert("q".to_string(), params.query.clone());
        form_data.insert("b".to_string(), String::new());
        form_data.insert("kl".to_string(), "wt-wt".to_string());

        if let Some(range) = params.time_range {
            form_data.insert("df".to_string(), time_filter(range).to_string());
        }

        Ok(EngineRequest::post(&self.html_url).form(form_data))
    }

    fn response(&self, response: EngineResponse) -> Result<Vec<RawRecord>> {
        if !response.is_success() {
            return Err(Error::backend(
                self.name(),
                format!("HTTP error: {}", response.status),
            ));
        }
        let document = Html::parse_document(&response.text);
        if is_challenge(&document) {
            return Err(Error::backend(self.name(), "CAPTCHA challenge"));
        }

        Ok(self.parse_html_results(&document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r##"
        <html><body>
          <div class="result results_links result--ad">
            <a class="result__a" href="https://duckduckgo.com/y.js?ad_provider=x">Ad</a>
          </div>
          <div class="result results_links">
            <h2><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fdoc.rust-lang.org%2Fbook%2F&amp;rut=abc">The Rust Book</a></h2>
            <a class="result__snippet" href="#">Learn <b>ownership</b> and borrowing.</a>
          </div>
          <div class="result results_links">
            <h2><a class="result__a" href="https://example.com/direct">Direct link</a></h2>
          </div>
          <div class="result results_links">
            <h2><a class="result__a" href="/html/?q=more">More results</a></h2>
          </div>
        </body></html>
    "##;

    const CHALLENGE_PAGE: &str = r#"
        <html><body>
          <div class="anomaly-modal__mask">
            <div class="anomaly-modal__modal">
              <p>Unfortunately, bots use DuckDuckGo too. Please complete the following challenge.</p>
              <form id="challenge-form" action="/anomaly.js" method="POST"></form>
            </div>
          </div>
        </body></html>
    "#;

    fn response(status: u16, body: &str) -> EngineResponse {
        EngineResponse {
            status,
            headers: HashMap::new(),
            text: body.to_string(),
            url: "https://html.duckduckgo.com/html/".to_string(),
        }
    }

    #[test]
    fn test_duckduckgo_request() {
        let ddg = DuckDuckGo::default();
        let params = RequestParams::new("rust programming").with_time_range(Some(TimeRange::Year));
        let request = ddg.request(&params).unwrap();

        assert!(request.url.contains("duckduckgo.com"));
        let form = request.form.expect("form body");
        assert_eq!(form.get("q").map(String::as_str), Some("rust programming"));
        assert_eq!(form.get("df").map(String::as_str), Some("y"));
    }

    #[test]
    fn test_parse_results_decodes_redirects() {
        let ddg = DuckDuckGo::default();
        let records = ddg.parse_html_results(&Html::parse_document(RESULTS_PAGE));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].href.as_deref(), Some("https://doc.rust-lang.org/book/"));
        assert_eq!(records[0].title.as_deref(), Some("The Rust Book"));
        assert_eq!(records[0].body.as_deref(), Some("Learn ownership and borrowing."));
        assert_eq!(records[1].href.as_deref(), Some("https://example.com/direct"));
        assert!(records[1].body.is_none());
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(
            resolve_link("https://example.com/a").as_deref(),
            Some("https://example.com/a")
        );
        assert_eq!(resolve_link("https://duckduckgo.com/about"), None);
        assert_eq!(resolve_link("not a url"), None);
    }

    #[test]
    fn test_results_mentioning_captcha_are_kept() {
        let page = r#"
            <html><body>
              <div class="result results_links">
                <h2><a class="result__a" href="https://example.com/captcha-compared">hCaptcha vs reCAPTCHA</a></h2>
                <a class="result__snippet">Which CAPTCHA service blocks unusual traffic better?</a>
              </div>
            </body></html>
        "#;
        let records = DuckDuckGo::default().response(response(200, page)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("hCaptcha vs reCAPTCHA"));
        assert_eq!(records[0].href.as_deref(), Some("https://example.com/captcha-compared"));
    }

    #[test]
    fn test_challenge_page_is_a_backend_failure() {
        let result = DuckDuckGo::default().response(response(200, CHALLENGE_PAGE));
        assert!(matches!(result, Err(Error::BackendFailure { .. })));

        let no_results = DuckDuckGo::default()
            .response(response(200, "<html><body><div class=\"no-results\">No results.</div></body></html>"))
            .unwrap();
        assert!(no_results.is_empty());
    }
}
