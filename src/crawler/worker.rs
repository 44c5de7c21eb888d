//! Seed worker: paginates one seed to exhaustion
//!
//! For each page the worker claims a request from the shared budget, fetches
//! the page, extracts its records, persists them, and follows the next-page
//! link. Pages are strictly sequential within a seed. Every failure is
//! contained to the seed; `run` never returns an error.

use crate::config::{PAGE_PLACEHOLDER, SEED_PLACEHOLDER};
use crate::crawler::budget::{Acquire, RequestBudget};
use crate::crawler::extractor::{ExtractError, ExtractedPage, RecordExtractor};
use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::state::{Seed, SeedStatus};
use crate::storage::{RecordStore, SeedStore};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Why a single page was skipped
#[derive(Debug, Error)]
pub enum PageError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),
}

/// How a seed's pagination ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Every page was visited; the seed is now `done`
    Done,

    /// Pagination could not continue; the seed is now `failed`
    Failed { reason: String },

    /// The run's request budget ran out; the seed stays `pending`
    BudgetExhausted,
}

/// Result of running one seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedOutcome {
    pub seed_id: String,
    pub kind: OutcomeKind,
    /// Page requests this seed consumed from the budget
    pub pages_requested: u32,
    /// Records accepted by the record store
    pub records_persisted: usize,
}

impl SeedOutcome {
    fn new(seed_id: &str) -> Self {
        Self {
            seed_id: seed_id.to_string(),
            kind: OutcomeKind::BudgetExhausted,
            pages_requested: 0,
            records_persisted: 0,
        }
    }

    /// Outcome for a seed whose task faulted before it could report
    pub fn fault(seed_id: &str, detail: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Failed {
                reason: detail.into(),
            },
            ..Self::new(seed_id)
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.kind, OutcomeKind::Failed { .. })
    }
}

/// External collaborators shared by every worker of a run
#[derive(Clone)]
pub struct HarvestContext {
    pub fetcher: Arc<dyn PageFetcher>,
    pub extractor: Arc<dyn RecordExtractor>,
    pub seeds: Arc<dyn SeedStore>,
    pub records: Arc<dyn RecordStore>,
    /// Fallback URL pattern used to step over one failed page
    pub page_url_template: Option<String>,
}

impl HarvestContext {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn RecordExtractor>,
        seeds: Arc<dyn SeedStore>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            seeds,
            records,
            page_url_template: None,
        }
    }

    pub fn with_page_url_template(mut self, template: Option<String>) -> Self {
        self.page_url_template = template;
        self
    }
}

/// Pagination end state, before the seed status is written
enum PaginationEnd {
    Exhausted,
    Failed(String),
    BudgetExhausted,
}

/// Processes one seed at a time against a shared request budget
#[derive(Clone)]
pub struct SeedWorker {
    context: HarvestContext,
    budget: Arc<RequestBudget>,
}

impl SeedWorker {
    pub fn new(context: HarvestContext, budget: Arc<RequestBudget>) -> Self {
        Self { context, budget }
    }

    /// Paginates `seed` until it runs out of pages, fails, or the budget is spent
    pub async fn run(&self, seed: &Seed) -> SeedOutcome {
        let mut outcome = SeedOutcome::new(&seed.id);

        let seed_url = match Url::parse(&seed.page_url) {
            Ok(url) => url,
            Err(e) => {
                let end = PaginationEnd::Failed(format!("invalid seed URL '{}': {}", seed.page_url, e));
                return self.finalize(seed, end, outcome);
            }
        };

        let mut page_url = seed_url.clone();
        let mut visited = HashSet::from([page_url.clone()]);
        let mut page_number: u32 = 1;
        // Page 1 has no predecessor, so a failure there has nothing to continue from
        let mut previous_page_ok = false;

        let end = loop {
            let request_number = match self.budget.acquire() {
                Acquire::Granted { request_number } => request_number,
                Acquire::Exhausted { .. } => {
                    tracing::info!(
                        "Seed {} stopped at page {}: request budget exhausted",
                        seed.id,
                        page_number
                    );
                    break PaginationEnd::BudgetExhausted;
                }
            };

            tracing::debug!("Request #{}: {}", request_number, page_url);
            outcome.pages_requested += 1;

            match self.harvest_page(&page_url).await {
                Ok(page) => {
                    self.persist(&page, &page_url, &mut outcome);
                    previous_page_ok = true;

                    match page.next_page {
                        Some(next) if !visited.insert(next.clone()) => {
                            break PaginationEnd::Failed(format!("pagination cycle at {}", next))
                        }
                        Some(next) => page_url = next,
                        None => break PaginationEnd::Exhausted,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping page {} of seed {} ({}): {}",
                        page_number,
                        seed.id,
                        page_url,
                        e
                    );

                    let continuation = if previous_page_ok {
                        self.template_url(&seed_url, page_number + 1)
                    } else {
                        None
                    };

                    match continuation {
                        Some(next) if !visited.insert(next.clone()) => {
                            break PaginationEnd::Failed(format!("pagination cycle at {}", next))
                        }
                        Some(next) => {
                            previous_page_ok = false;
                            page_url = next;
                        }
                        None => {
                            break PaginationEnd::Failed(format!("page {}: {}", page_number, e))
                        }
                    }
                }
            }

            page_number += 1;
        };

        self.finalize(seed, end, outcome)
    }

    async fn harvest_page(&self, page_url: &Url) -> Result<ExtractedPage, PageError> {
        let body = self.context.fetcher.fetch(page_url.as_str()).await?;
        let page = self.context.extractor.extract(&body, page_url)?;
        Ok(page)
    }

    /// Stores a page's records; write failures are logged and swallowed
    fn persist(&self, page: &ExtractedPage, page_url: &Url, outcome: &mut SeedOutcome) {
        if page.records.is_empty() {
            return;
        }

        match self.context.records.bulk_insert(&page.records) {
            Ok(report) => {
                outcome.records_persisted += report.accepted;
                if report.rejected > 0 {
                    tracing::debug!(
                        "{} of {} records from {} were rejected",
                        report.rejected,
                        page.records.len(),
                        page_url
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to store {} records from {}: {}",
                    page.records.len(),
                    page_url,
                    e
                );
            }
        }
    }

    /// URL of `page_number` according to the configured template
    fn template_url(&self, seed_url: &Url, page_number: u32) -> Option<Url> {
        let template = self.context.page_url_template.as_deref()?;
        let rendered = template
            .replace(SEED_PLACEHOLDER, seed_url.as_str().trim_end_matches('/'))
            .replace(PAGE_PLACEHOLDER, &page_number.to_string());
        seed_url.join(&rendered).ok()
    }

    /// Outcome matching the status another writer already stored
    fn stored_outcome(&self, seed_id: &str, fallback: OutcomeKind) -> OutcomeKind {
        match self.context.seeds.get_seed(seed_id) {
            Ok(Some(stored)) => match stored.status {
                SeedStatus::Done => OutcomeKind::Done,
                SeedStatus::Failed => OutcomeKind::Failed {
                    reason: "seed was already marked failed".to_string(),
                },
                SeedStatus::Pending => fallback,
            },
            Ok(None) => fallback,
            Err(e) => {
                tracing::warn!("Failed to read back seed {}: {}", seed_id, e);
                fallback
            }
        }
    }

    /// Writes the terminal status, if any, and completes the outcome
    fn finalize(&self, seed: &Seed, end: PaginationEnd, mut outcome: SeedOutcome) -> SeedOutcome {
        let (kind, status) = match end {
            PaginationEnd::Exhausted => (OutcomeKind::Done, Some(SeedStatus::Done)),
            PaginationEnd::Failed(reason) => {
                (OutcomeKind::Failed { reason }, Some(SeedStatus::Failed))
            }
            PaginationEnd::BudgetExhausted => (OutcomeKind::BudgetExhausted, None),
        };
        outcome.kind = kind;

        if let Some(status) = status {
            match self.context.seeds.update_status(&seed.id, status) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!("Seed {} was no longer pending; status left unchanged", seed.id);
                    outcome.kind = self.stored_outcome(&seed.id, outcome.kind);
                }
                Err(e) => {
                    tracing::error!("Failed to mark seed {} as {}: {}", seed.id, status, e);
                    outcome.kind = OutcomeKind::Failed {
                        reason: format!("status update to {} failed: {}", status, e),
                    };
                }
            }
        }

        tracing::info!(
            "Seed {} finished ({:?}): {} pages, {} records",
            seed.id,
            outcome.kind,
            outcome.pages_requested,
            outcome.records_persisted
        );

        outcome
    }
}
