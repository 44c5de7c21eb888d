//! Flat-file export of harvested records

use crate::output::ExportResult;
use crate::state::Record;
use crate::storage::RecordStore;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column order of the CSV export
pub const CSV_HEADER: [&str; 4] = ["quote", "author", "tags", "source_url"];

/// Joins a record's tags into its single CSV cell
pub const TAG_SEPARATOR: &str = " | ";

/// Exports every stored record to `csv_path` and `json_path`
///
/// # Returns
///
/// * `Ok(n)` - Number of records written to each file; 0 means nothing was written
/// * `Err(ExportError)` - Reading the store or writing a file failed
pub fn export_records(
    store: &dyn RecordStore,
    csv_path: &Path,
    json_path: &Path,
) -> ExportResult<usize> {
    let records = store.all_records()?;

    if records.is_empty() {
        tracing::warn!("No records to export");
        return Ok(0);
    }

    write_csv(&records, csv_path)?;
    tracing::info!("Exported {} records to {}", records.len(), csv_path.display());

    write_json(&records, json_path)?;
    tracing::info!("Exported {} records to {}", records.len(), json_path.display());

    Ok(records.len())
}

/// Writes records as CSV with tags joined by `TAG_SEPARATOR`
pub fn write_csv(records: &[Record], path: &Path) -> ExportResult<()> {
    ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for record in records {
        let tags = record.tags.join(TAG_SEPARATOR);
        writer.write_record([
            record.quote_text.as_str(),
            record.author.as_str(),
            tags.as_str(),
            record.source_url.as_str(),
        ])?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes records as a pretty-printed JSON array
pub fn write_json(records: &[Record], path: &Path) -> ExportResult<()> {
    ensure_parent_dir(path)?;

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
