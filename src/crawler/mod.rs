//! Crawler module for seed pagination
//!
//! This module contains the core harvesting logic, including:
//! - The shared request budget
//! - HTTP fetching of listing pages
//! - Record and next-link extraction
//! - Per-seed pagination workers
//! - Pool coordination and run aggregation

mod budget;
mod coordinator;
mod extractor;
mod fetcher;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use budget::{Acquire, RequestBudget};
pub use coordinator::{run_harvest, Coordinator, CrawlRun, RunSummary, SeedFailure};
pub use extractor::{ExtractError, ExtractedPage, QuotesExtractor, RecordExtractor};
pub use fetcher::{build_http_client, format_user_agent, FetchError, HttpFetcher, PageFetcher};
pub use worker::{HarvestContext, OutcomeKind, PageError, SeedOutcome, SeedWorker};
