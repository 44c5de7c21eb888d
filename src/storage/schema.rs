//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Quote Harvest database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Listing pages to paginate, with their harvest status
CREATE TABLE IF NOT EXISTS seeds (
    id TEXT PRIMARY KEY,
    page_url TEXT NOT NULL,
    status TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_seeds_status ON seeds(status);

-- Extracted quotes; duplicates across pages are allowed
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    quote_text TEXT NOT NULL CHECK (length(quote_text) > 0),
    author TEXT NOT NULL CHECK (length(author) > 0),
    tags TEXT NOT NULL,
    source_url TEXT NOT NULL,
    extracted_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_records_source ON records(source_url);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
