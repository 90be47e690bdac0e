//! Text extraction capabilities
//!
//! Two seams: [`TextExtractor`] turns an HTML document into readable text and
//! is shared by the static tier and the render pass; [`DocumentTextExtractor`]
//! decodes binary documents.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Turns an HTML document into readable text
pub trait TextExtractor: Send + Sync {
    /// Extract the main text; `None` when nothing readable is found
    fn extract(&self, html: &str, url: Option<&str>) -> Option<String>;
}

/// Turns a binary document into text
pub trait DocumentTextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Elements whose content never counts as page text
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "iframe", "nav", "footer", "header",
    "aside", "form", "button", "head",
];

/// Elements that start a new paragraph
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul",
    "ol", "pre", "blockquote", "table", "tr", "br", "hr", "dd", "dt", "figcaption",
];

/// Candidates for the main content area, best first
const CONTENT_SELECTORS: &[&str] = &["article", "main", "[role=\"main\"]", "body"];

static CONTENT: Lazy<Vec<Selector>> = Lazy::new(|| {
    CONTENT_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
});

static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid blank line pattern"));

/// Paragraph-preserving HTML text extractor built on `scraper`
pub struct HtmlTextExtractor {
    max_chars: usize,
}

impl HtmlTextExtractor {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Default for HtmlTextExtractor {
    fn default() -> Self {
        Self::new(100_000)
    }
}

impl TextExtractor for HtmlTextExtractor {
    fn extract(&self, html: &str, _url: Option<&str>) -> Option<String> {
        let document = Html::parse_document(html);

        let text = CONTENT
            .iter()
            .filter_map(|selector| document.select(selector).next())
            .map(element_text)
            .find(|text| !text.is_empty())
            .unwrap_or_else(|| element_text(document.root_element()));

        if text.is_empty() {
            return None;
        }
        Some(truncate_chars(&text, self.max_chars))
    }
}

/// Collects inline text into lines and lines into paragraphs
#[derive(Default)]
struct TextBuffer {
    paragraphs: Vec<String>,
    current: String,
    pending_space: bool,
}

impl TextBuffer {
    /// Append a text node, keeping word boundaries across inline elements
    fn push_inline(&mut self, text: &str) {
        if text.trim().is_empty() {
            self.pending_space |= !text.is_empty();
            return;
        }
        if text.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }
        for (i, word) in text.split_whitespace().enumerate() {
            if !self.current.is_empty() && (i > 0 || self.pending_space) {
                self.current.push(' ');
            }
            self.current.push_str(word);
        }
        self.pending_space = text.ends_with(char::is_whitespace);
    }

    fn break_block(&mut self) {
        self.pending_space = false;
        if !self.current.is_empty() {
            self.paragraphs.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> String {
        self.break_block();
        let joined = self.paragraphs.join("\n\n");
        BLANK_LINES.replace_all(&joined, "\n\n").trim().to_string()
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    let mut buffer = TextBuffer::default();
    walk(element, &mut buffer);
    buffer.finish()
}

fn walk(element: ElementRef<'_>, out: &mut TextBuffer) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_inline(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) || el.attr("hidden").is_some() {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.break_block();
                }
                walk(child_el, out);
                if block {
                    out.break_block();
                }
            }
            _ => {}
        }
    }
}

/// Truncate on a character boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// PDF text extraction through `pdf-extract`
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl DocumentTextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| Error::ExtractionFailure(format!("pdf decoding failed: {}", e)))
    }
}
