//! Content retrieval pipeline
//!
//! Every URL is classified by a cheap probe, then resolved by the cheapest
//! tier that applies: static HTML text, binary document decoding, or a
//! headless browser. Browser work for a batch is collected and done in a
//! single session after the cheap tiers finish.

mod batch;
mod extract;
mod probe;
mod render;
mod tiered;

pub use batch::{BatchAggregator, BatchResult};
pub use extract::{
    truncate_chars, DocumentTextExtractor, HtmlTextExtractor, PdfTextExtractor, TextExtractor,
};
pub use probe::{is_document, is_js_shell, Classification, RetrievalProbe};
pub use render::{ChromiumRenderer, RenderEscalation, RenderQueue, RenderSession, Renderer};
pub use tiered::{RetrievalOutcome, TieredExtractor};
