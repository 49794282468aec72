//! SQL DDL for the history tables.
//!
//! Defines the `stays` table (one row per recorded visit) and `schema_meta`.
//! All DDL uses `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

/// All schema DDL statements.
///
/// Timestamps are RFC 3339 text; a NULL `end_time` means the stay is still
/// open. `blog_post_url` and `blog_post_name` are written and cleared as a
/// pair.
const SCHEMA_SQL: &str = r#"
-- One row per visit to a location
CREATE TABLE IF NOT EXISTS stays (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_time TEXT NOT NULL,
    end_time TEXT,
    trip_group TEXT NOT NULL DEFAULT 'unknown',
    name TEXT NOT NULL,
    country TEXT NOT NULL DEFAULT 'unknown',
    timezone_offset INTEGER NOT NULL DEFAULT 0,
    blog_post_url TEXT,
    blog_post_name TEXT,
    map_url TEXT
);

CREATE INDEX IF NOT EXISTS idx_stays_start ON stays(start_time);
CREATE INDEX IF NOT EXISTS idx_stays_end ON stays(end_time);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
