//! Crawl coordinator - fans seeds out over a fixed worker pool
//!
//! This module contains the orchestration that:
//! - Validates run parameters before any work starts
//! - Builds one request budget shared by every worker
//! - Submits every seed eagerly; a semaphore bounds how many run at once
//! - Waits for all seeds behind a single join barrier
//! - Aggregates outcomes into a `CrawlRun`

use crate::config::{validate_run_parameters, Config};
use crate::crawler::budget::RequestBudget;
use crate::crawler::extractor::QuotesExtractor;
use crate::crawler::fetcher::{build_http_client, HttpFetcher};
use crate::crawler::worker::{HarvestContext, OutcomeKind, SeedOutcome, SeedWorker};
use crate::state::{Seed, SeedStatus};
use crate::storage::{SeedStore, SqliteStorage};
use crate::HarvestError;
use futures::future::join_all;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinError;

/// A seed that ended the run as `failed`, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedFailure {
    pub seed_id: String,
    pub reason: String,
}

/// Aggregated result of one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlRun {
    pub seeds_submitted: usize,
    pub seeds_completed: usize,
    pub seeds_failed: usize,
    pub seeds_budget_exhausted: usize,
    pub requests_consumed: u64,
    pub records_persisted: usize,
    pub elapsed: Duration,
    pub failures: Vec<SeedFailure>,
}

/// Totals reported at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub total_requests: u64,
    pub total_seeds_done: usize,
    pub total_seeds_failed: usize,
    pub total_seeds_budget_exhausted: usize,
    pub elapsed_seconds: f64,
}

impl CrawlRun {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            total_requests: self.requests_consumed,
            total_seeds_done: self.seeds_completed,
            total_seeds_failed: self.seeds_failed,
            total_seeds_budget_exhausted: self.seeds_budget_exhausted,
            elapsed_seconds: self.elapsed.as_secs_f64(),
        }
    }

    fn record(&mut self, outcome: SeedOutcome) {
        self.records_persisted += outcome.records_persisted;
        match outcome.kind {
            OutcomeKind::Done => self.seeds_completed += 1,
            OutcomeKind::BudgetExhausted => self.seeds_budget_exhausted += 1,
            OutcomeKind::Failed { reason } => {
                self.seeds_failed += 1;
                self.failures.push(SeedFailure {
                    seed_id: outcome.seed_id,
                    reason,
                });
            }
        }
    }
}

/// Main coordinator structure
pub struct Coordinator {
    context: HarvestContext,
}

impl Coordinator {
    pub fn new(context: HarvestContext) -> Self {
        Self { context }
    }

    /// Runs every seed through a pool of `pool_size` workers
    ///
    /// # Arguments
    ///
    /// * `seeds` - Seeds to paginate; each is assigned to exactly one task
    /// * `pool_size` - Maximum number of seeds processed concurrently
    /// * `budget_limit` - Total page requests allowed across all workers
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlRun)` - All seeds were processed; individual failures are in the run
    /// * `Err(HarvestError)` - Invalid parameters; no worker was started
    pub async fn run_all(
        &self,
        seeds: Vec<Seed>,
        pool_size: usize,
        budget_limit: u64,
    ) -> Result<CrawlRun, HarvestError> {
        validate_run_parameters(pool_size, budget_limit)?;

        let start_time = Instant::now();
        let budget = Arc::new(RequestBudget::new(budget_limit));
        let pool = Arc::new(Semaphore::new(pool_size));
        let worker = SeedWorker::new(self.context.clone(), Arc::clone(&budget));

        tracing::info!(
            "Dispatching {} seeds to {} workers (request limit {})",
            seeds.len(),
            pool_size,
            budget.limit()
        );

        let seed_ids: Vec<String> = seeds.iter().map(|s| s.id.clone()).collect();
        let handles: Vec<_> = seeds
            .into_iter()
            .map(|seed| {
                let worker = worker.clone();
                let pool = Arc::clone(&pool);
                tokio::spawn(async move {
                    match pool.acquire_owned().await {
                        Ok(_permit) => worker.run(&seed).await,
                        Err(e) => SeedOutcome::fault(&seed.id, format!("worker pool closed: {}", e)),
                    }
                })
            })
            .collect();

        let joined = join_all(handles).await;

        let mut run = CrawlRun {
            seeds_submitted: seed_ids.len(),
            ..CrawlRun::default()
        };

        for (seed_id, result) in seed_ids.iter().zip(joined) {
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(e) => self.handle_fault(seed_id, e),
            };
            run.record(outcome);
        }

        run.requests_consumed = budget.consumed();
        run.elapsed = start_time.elapsed();

        tracing::info!(
            "Run finished: {} done, {} failed, {} stopped by budget, {} requests in {:.2}s",
            run.seeds_completed,
            run.seeds_failed,
            run.seeds_budget_exhausted,
            run.requests_consumed,
            run.elapsed.as_secs_f64()
        );

        Ok(run)
    }

    /// Turns a crashed worker task into a `failed` outcome
    ///
    /// The seed is marked failed in the store only if it is still pending.
    fn handle_fault(&self, seed_id: &str, error: JoinError) -> SeedOutcome {
        let detail = fault_detail(error);
        tracing::error!("Worker for seed {} faulted: {}", seed_id, detail);

        if let Err(e) = self.context.seeds.update_status(seed_id, SeedStatus::Failed) {
            tracing::error!("Failed to mark faulted seed {} as failed: {}", seed_id, e);
        }

        SeedOutcome::fault(seed_id, format!("worker fault: {}", detail))
    }
}

fn fault_detail(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }

    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Runs a complete harvest from configuration
///
/// This function:
///
/// 1. Opens the seed and record store
/// 2. Loads pending seeds, up to the configured cap
/// 3. Builds the HTTP fetcher and quote extractor
/// 4. Runs all seeds through the worker pool
///
/// Returns an empty run when no seeds are pending.
pub async fn run_harvest(config: &Config) -> Result<CrawlRun, HarvestError> {
    let storage = Arc::new(SqliteStorage::new(Path::new(&config.output.database_path))?);

    let pending = storage.find_by_status(SeedStatus::Pending, config.harvest.pending_seed_cap)?;
    if pending.is_empty() {
        tracing::warn!("No pending seeds found");
        return Ok(CrawlRun::default());
    }
    tracing::info!("Found {} pending seeds. Processing...", pending.len());

    let client = build_http_client(
        &config.user_agent,
        Duration::from_secs(config.harvest.request_timeout_secs),
    )?;

    let context = HarvestContext::new(
        Arc::new(HttpFetcher::new(client)),
        Arc::new(QuotesExtractor::new()),
        storage.clone(),
        storage,
    )
    .with_page_url_template(config.harvest.page_url_template.clone());

    Coordinator::new(context)
        .run_all(pending, config.harvest.pool_size, config.harvest.request_limit)
        .await
}
