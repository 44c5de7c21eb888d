//! Storage traits and error types
//!
//! The harvester talks to its stores only through `SeedStore` and
//! `RecordStore`, so workers can share one backend across tasks.

use crate::state::{Record, Seed, SeedStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid status transition for seed {seed_id}: -> {to}")]
    InvalidTransition { seed_id: String, to: SeedStatus },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of a best-effort bulk insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    /// Records written to the store
    pub accepted: usize,
    /// Records skipped because they failed validation or the write failed
    pub rejected: usize,
}

/// Durable collection of seeds and their statuses
pub trait SeedStore: Send + Sync {
    /// Returns up to `limit` seeds with the given status, ordered by id
    fn find_by_status(&self, status: SeedStatus, limit: usize) -> StorageResult<Vec<Seed>>;

    /// Moves a pending seed to a terminal status
    ///
    /// Returns `Ok(false)` when the seed is missing or already terminal; a
    /// terminal seed is never changed again.
    fn update_status(&self, seed_id: &str, status: SeedStatus) -> StorageResult<bool>;

    /// Inserts a pending seed, or refreshes the URL of a seed that is still pending
    ///
    /// Returns `true` if the seed was newly created.
    fn upsert_seed(&self, id: &str, page_url: &str) -> StorageResult<bool>;

    /// Gets a seed by id
    fn get_seed(&self, seed_id: &str) -> StorageResult<Option<Seed>>;

    /// Counts seeds with the given status
    fn count_by_status(&self, status: SeedStatus) -> StorageResult<u64>;
}

/// Durable, append-only collection of extracted records
pub trait RecordStore: Send + Sync {
    /// Inserts a batch, skipping records that cannot be stored
    ///
    /// A rejected record never aborts the rest of the batch. An `Err` means
    /// the batch as a whole could not be written.
    fn bulk_insert(&self, records: &[Record]) -> StorageResult<InsertReport>;

    /// Loads every stored record in insertion order
    fn all_records(&self) -> StorageResult<Vec<Record>>;

    /// Counts stored records
    fn count_records(&self) -> StorageResult<u64>;
}
