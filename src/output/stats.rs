//! Statistics generation from the harvest database
//!
//! This module provides functionality for extracting and displaying
//! seed and record statistics from the storage layer.

use crate::crawler::RunSummary;
use crate::state::SeedStatus;
use crate::storage::{RecordStore, SeedStore, StorageResult};

/// Harvest statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestStatistics {
    /// Seed counts in `SeedStatus::all_statuses` order
    pub seeds_by_status: Vec<(SeedStatus, u64)>,

    /// Total number of seeds in the store
    pub total_seeds: u64,

    /// Total number of stored records
    pub total_records: u64,
}

impl HarvestStatistics {
    pub fn count(&self, status: SeedStatus) -> u64 {
        self.seeds_by_status
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

/// Loads statistics from storage
pub fn load_statistics(
    seeds: &dyn SeedStore,
    records: &dyn RecordStore,
) -> StorageResult<HarvestStatistics> {
    let mut seeds_by_status = Vec::new();
    for status in SeedStatus::all_statuses() {
        seeds_by_status.push((status, seeds.count_by_status(status)?));
    }

    let total_seeds = seeds_by_status.iter().map(|(_, count)| count).sum();
    let total_records = records.count_records()?;

    Ok(HarvestStatistics {
        seeds_by_status,
        total_seeds,
        total_records,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Seeds by Status:");
    for (status, count) in &stats.seeds_by_status {
        let percentage = if stats.total_seeds > 0 {
            (*count as f64 / stats.total_seeds as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!("  Total: {}", stats.total_seeds);
    println!();

    println!("Records stored: {}", stats.total_records);
}

/// Prints the end-of-run summary
pub fn print_run_summary(summary: &RunSummary) {
    println!("=== Run Summary ===\n");
    println!("  Requests made: {}", summary.total_requests);
    println!("  Seeds done: {}", summary.total_seeds_done);
    println!("  Seeds failed: {}", summary.total_seeds_failed);
    println!(
        "  Seeds stopped by request limit: {}",
        summary.total_seeds_budget_exhausted
    );
    println!("  Elapsed: {:.2}s", summary.elapsed_seconds);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Record;
    use crate::storage::SqliteStorage;

    #[test]
    fn test_load_statistics() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.upsert_seed("a", "https://quotes.example/a").unwrap();
        storage.upsert_seed("b", "https://quotes.example/b").unwrap();
        storage.upsert_seed("c", "https://quotes.example/c").unwrap();
        storage.update_status("a", SeedStatus::Done).unwrap();
        storage.update_status("b", SeedStatus::Failed).unwrap();
        storage
            .bulk_insert(&[Record {
                quote_text: "q".to_string(),
                author: "a".to_string(),
                tags: vec![],
                source_url: "https://quotes.example/a".to_string(),
            }])
            .unwrap();

        let stats = load_statistics(&storage, &storage).unwrap();

        assert_eq!(stats.total_seeds, 3);
        assert_eq!(stats.total_records, 1);
        assert_eq!(stats.count(SeedStatus::Pending), 1);
        assert_eq!(stats.count(SeedStatus::Done), 1);
        assert_eq!(stats.count(SeedStatus::Failed), 1);
    }

    #[test]
    fn test_empty_store() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let stats = load_statistics(&storage, &storage).unwrap();

        assert_eq!(stats.total_seeds, 0);
        assert_eq!(stats.seeds_by_status.len(), 3);
    }
}
