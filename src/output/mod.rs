//! Output module for exports and run reporting
//!
//! This module handles:
//! - Exporting every stored record to CSV and JSON files
//! - Loading and printing seed/record statistics
//! - Printing the end-of-run summary

mod export;
pub mod stats;

pub use export::{export_records, write_csv, write_json, CSV_HEADER, TAG_SEPARATOR};
pub use stats::{load_statistics, print_run_summary, print_statistics, HarvestStatistics};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur while exporting records
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
