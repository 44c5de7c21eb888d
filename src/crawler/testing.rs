//! In-memory fetchers and page builders for crawler tests

use crate::crawler::fetcher::{FetchError, PageFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Builds a listing page in quotes.toscrape markup
pub fn listing_page(quotes: &[&str], next: Option<&str>) -> String {
    let mut html = String::from("<html><body>\n");
    for quote in quotes {
        html.push_str(&format!(
            r#"<div class="quote">
                <span class="text">{quote}</span>
                <span>by <small class="author">Author of {quote}</small></span>
                <div class="tags">Tags: <a class="tag" href="/tag/test/">test</a></div>
            </div>
"#
        ));
    }
    if let Some(href) = next {
        html.push_str(&format!(
            r#"<ul class="pager"><li class="next"><a href="{href}">Next</a></li></ul>
"#
        ));
    }
    html.push_str("</body></html>");
    html
}

/// Serves canned pages by URL; anything else is a 404
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    delay: Option<Duration>,
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: String) -> Self {
        self.pages.insert(url.to_string(), body);
        self
    }

    /// Holds every fetch open for `delay` so overlapping calls can be observed
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Highest number of fetches that were in progress at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let result = self
            .pages
            .get(url)
            .cloned()
            .ok_or(FetchError::Status { status_code: 404 });

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Delegates to a `StaticFetcher` but panics on one URL
pub struct PanickingFetcher {
    inner: StaticFetcher,
    panic_url: String,
}

impl PanickingFetcher {
    pub fn new(inner: StaticFetcher, panic_url: &str) -> Self {
        Self {
            inner,
            panic_url: panic_url.to_string(),
        }
    }
}

#[async_trait]
impl PageFetcher for PanickingFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if url == self.panic_url {
            panic!("fetcher exploded on {}", url);
        }
        self.inner.fetch(url).await
    }
}
