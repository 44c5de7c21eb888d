use crate::state::SeedStatus;
use serde::Serialize;

/// A listing URL to paginate, with its externally assigned identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seed {
    pub id: String,
    pub page_url: String,
    pub status: SeedStatus,
}

impl Seed {
    /// Creates a new pending seed
    pub fn pending(id: impl Into<String>, page_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            page_url: page_url.into(),
            status: SeedStatus::Pending,
        }
    }
}

/// One quote extracted from a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    #[serde(rename = "quote")]
    pub quote_text: String,
    pub author: String,
    /// Tags in the order they appear on the page
    pub tags: Vec<String>,
    /// The page the quote was extracted from
    pub source_url: String,
}

impl Record {
    /// Checks the fields a stored record must carry
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.quote_text.trim().is_empty() {
            return Err("quote text is empty".to_string());
        }
        if self.author.trim().is_empty() {
            return Err("author is empty".to_string());
        }
        if self.source_url.is_empty() {
            return Err("source url is empty".to_string());
        }
        Ok(())
    }
}
