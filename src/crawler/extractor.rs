//! Record extraction from listing pages
//!
//! This module turns a listing page into:
//! - The quote records it contains
//! - The link to the next listing page, if any

use crate::state::Record;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Why a page's records could not be extracted
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },

    #[error("Quote #{index} has no {field}")]
    MissingField { index: usize, field: &'static str },
}

/// Everything taken from one listing page
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    /// Records in page order
    pub records: Vec<Record>,

    /// Absolute URL of the next listing page
    pub next_page: Option<Url>,
}

/// Turns page content into records; swappable per target site
pub trait RecordExtractor: Send + Sync {
    fn extract(&self, body: &str, page_url: &Url) -> Result<ExtractedPage, ExtractError>;
}

/// Extractor for quotes.toscrape-style listing markup
///
/// Each `div.quote` holds `span.text`, `small.author` and `div.tags a.tag`;
/// pagination lives in `li.next a[href]`.
#[derive(Debug, Clone, Default)]
pub struct QuotesExtractor;

impl QuotesExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

impl RecordExtractor for QuotesExtractor {
    fn extract(&self, body: &str, page_url: &Url) -> Result<ExtractedPage, ExtractError> {
        let document = Html::parse_document(body);

        let quote_selector = selector("div.quote")?;
        let text_selector = selector("span.text")?;
        let author_selector = selector("small.author")?;
        let tag_selector = selector("div.tags a.tag")?;
        let next_selector = selector("li.next a[href]")?;

        let mut records = Vec::new();
        for (index, quote) in document.select(&quote_selector).enumerate() {
            let quote_text = quote
                .select(&text_selector)
                .next()
                .map(element_text)
                .filter(|s| !s.is_empty())
                .ok_or(ExtractError::MissingField {
                    index,
                    field: "text",
                })?;

            let author = quote
                .select(&author_selector)
                .next()
                .map(element_text)
                .filter(|s| !s.is_empty())
                .ok_or(ExtractError::MissingField {
                    index,
                    field: "author",
                })?;

            let tags = quote
                .select(&tag_selector)
                .map(element_text)
                .filter(|s| !s.is_empty())
                .collect();

            records.push(Record {
                quote_text,
                author,
                tags,
                source_url: page_url.to_string(),
            });
        }

        let next_page = document
            .select(&next_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_link(href, page_url));

        Ok(ExtractedPage { records, next_page })
    }
}

/// Resolves a pagination href against the page it appeared on
///
/// Returns None for empty, fragment-only, or non-HTTP(S) links.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    base_url
        .join(href)
        .ok()
        .filter(|url| url.scheme() == "http" || url.scheme() == "https")
}
