//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the `SeedStore` and
//! `RecordStore` traits. The connection sits behind a mutex so one storage
//! value can be shared by every worker.

use crate::state::{Record, Seed, SeedStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{InsertReport, RecordStore, SeedStore, StorageError, StorageResult};
use crate::HarvestError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

fn seed_from_row(row: &Row<'_>) -> rusqlite::Result<Seed> {
    Ok(Seed {
        id: row.get(0)?,
        page_url: row.get(1)?,
        // Unknown statuses are treated as terminal so they are never re-harvested
        status: SeedStatus::from_db_string(&row.get::<_, String>(2)?)
            .unwrap_or(SeedStatus::Failed),
    })
}

impl SeedStore for SqliteStorage {
    fn find_by_status(&self, status: SeedStatus, limit: usize) -> StorageResult<Vec<Seed>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, page_url, status FROM seeds WHERE status = ?1 ORDER BY id LIMIT ?2",
        )?;

        let seeds = stmt
            .query_map(
                params![status.to_db_string(), limit as i64],
                seed_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(seeds)
    }

    fn update_status(&self, seed_id: &str, status: SeedStatus) -> StorageResult<bool> {
        if !SeedStatus::Pending.can_transition_to(status) {
            return Err(StorageError::InvalidTransition {
                seed_id: seed_id.to_string(),
                to: status,
            });
        }

        let now = Utc::now().to_rfc3339();
        let changed = self.conn()?.execute(
            "UPDATE seeds SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
            params![
                status.to_db_string(),
                now,
                seed_id,
                SeedStatus::Pending.to_db_string()
            ],
        )?;

        Ok(changed > 0)
    }

    fn upsert_seed(&self, id: &str, page_url: &str) -> StorageResult<bool> {
        let conn = self.conn()?;

        let existing: Option<String> = conn
            .query_row("SELECT id FROM seeds WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO seeds (id, page_url, status, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET page_url = excluded.page_url, updated_at = excluded.updated_at
             WHERE seeds.status = ?3",
            params![id, page_url, SeedStatus::Pending.to_db_string(), now],
        )?;

        Ok(existing.is_none())
    }

    fn get_seed(&self, seed_id: &str) -> StorageResult<Option<Seed>> {
        let conn = self.conn()?;
        let seed = conn
            .query_row(
                "SELECT id, page_url, status FROM seeds WHERE id = ?1",
                params![seed_id],
                seed_from_row,
            )
            .optional()?;
        Ok(seed)
    }

    fn count_by_status(&self, status: SeedStatus) -> StorageResult<u64> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM seeds WHERE status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl RecordStore for SqliteStorage {
    fn bulk_insert(&self, records: &[Record]) -> StorageResult<InsertReport> {
        let mut report = InsertReport::default();
        if records.is_empty() {
            return Ok(report);
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (quote_text, author, tags, source_url, extracted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for record in records {
                if let Err(reason) = record.validate() {
                    tracing::debug!("Rejecting record from {}: {}", record.source_url, reason);
                    report.rejected += 1;
                    continue;
                }

                let tags = serde_json::to_string(&record.tags)?;
                match stmt.execute(params![
                    record.quote_text,
                    record.author,
                    tags,
                    record.source_url,
                    now
                ]) {
                    Ok(_) => report.accepted += 1,
                    Err(e) => {
                        tracing::debug!("Failed to insert record from {}: {}", record.source_url, e);
                        report.rejected += 1;
                    }
                }
            }
        }

        tx.commit()?;
        Ok(report)
    }

    fn all_records(&self) -> StorageResult<Vec<Record>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT quote_text, author, tags, source_url FROM records ORDER BY id")?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(quote_text, author, tags, source_url)| -> StorageResult<Record> {
                Ok(Record {
                    quote_text,
                    author,
                    tags: serde_json::from_str(&tags)?,
                    source_url,
                })
            })
            .collect()
    }

    fn count_records(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
