//! Persistence interface for stays, plus the SQLite implementation.
//!
//! The engine only talks to [`HistoryStore`], so tests can substitute an
//! in-memory fake and assert on exactly which writes were issued.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::history::types::{BlogPost, NewStay, Stay};

/// Storage operations the timeline engine depends on.
///
/// Every field update is an independent write; the store offers no
/// transactional grouping across calls.
pub trait HistoryStore {
    fn fetch_all(&self) -> Result<Vec<Stay>>;
    fn fetch_by_id(&self, id: i64) -> Result<Option<Stay>>;
    /// Insert a resolved stay; the store assigns the id.
    fn insert(&self, stay: &NewStay) -> Result<()>;
    fn update_start(&self, id: i64, value: DateTime<Utc>) -> Result<()>;
    fn update_end(&self, id: i64, value: DateTime<Utc>) -> Result<()>;
    fn update_group(&self, id: i64, value: &str) -> Result<()>;
    fn update_name(&self, id: i64, value: &str) -> Result<()>;
    fn update_country(&self, id: i64, value: &str) -> Result<()>;
    fn update_timezone(&self, id: i64, value: i32) -> Result<()>;
    /// Set both blog post columns together.
    fn set_blog_post(&self, id: i64, url: &str, name: &str) -> Result<()>;
    /// Clear both blog post columns together.
    fn clear_blog_post(&self, id: i64) -> Result<()>;
    fn set_map_url(&self, id: i64, url: &str) -> Result<()>;
}

impl<S: HistoryStore + ?Sized> HistoryStore for &S {
    fn fetch_all(&self) -> Result<Vec<Stay>> {
        (**self).fetch_all()
    }
    fn fetch_by_id(&self, id: i64) -> Result<Option<Stay>> {
        (**self).fetch_by_id(id)
    }
    fn insert(&self, stay: &NewStay) -> Result<()> {
        (**self).insert(stay)
    }
    fn update_start(&self, id: i64, value: DateTime<Utc>) -> Result<()> {
        (**self).update_start(id, value)
    }
    fn update_end(&self, id: i64, value: DateTime<Utc>) -> Result<()> {
        (**self).update_end(id, value)
    }
    fn update_group(&self, id: i64, value: &str) -> Result<()> {
        (**self).update_group(id, value)
    }
    fn update_name(&self, id: i64, value: &str) -> Result<()> {
        (**self).update_name(id, value)
    }
    fn update_country(&self, id: i64, value: &str) -> Result<()> {
        (**self).update_country(id, value)
    }
    fn update_timezone(&self, id: i64, value: i32) -> Result<()> {
        (**self).update_timezone(id, value)
    }
    fn set_blog_post(&self, id: i64, url: &str, name: &str) -> Result<()> {
        (**self).set_blog_post(id, url, name)
    }
    fn clear_blog_post(&self, id: i64) -> Result<()> {
        (**self).clear_blog_post(id)
    }
    fn set_map_url(&self, id: i64, url: &str) -> Result<()> {
        (**self).set_map_url(id, url)
    }
}

/// [`HistoryStore`] backed by the `stays` table.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

const STAY_COLUMNS: &str = "id, start_time, end_time, trip_group, name, country, \
                            timezone_offset, blog_post_url, blog_post_name, map_url";

impl HistoryStore for SqliteStore<'_> {
    fn fetch_all(&self) -> Result<Vec<Stay>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {STAY_COLUMNS} FROM stays ORDER BY id"))?;
        let rows = stmt.query_map([], row_to_stay)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read stays")
    }

    fn fetch_by_id(&self, id: i64) -> Result<Option<Stay>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {STAY_COLUMNS} FROM stays WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], row_to_stay)?;
        rows.next().transpose().context("failed to read stay")
    }

    fn insert(&self, stay: &NewStay) -> Result<()> {
        self.conn.execute(
            "INSERT INTO stays (start_time, end_time, trip_group, name, country, timezone_offset) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                stay.start.to_rfc3339(),
                stay.end.map(|end| end.to_rfc3339()),
                stay.group,
                stay.name,
                stay.country,
                stay.timezone_offset,
            ],
        )?;
        Ok(())
    }

    fn update_start(&self, id: i64, value: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE stays SET start_time = ?1 WHERE id = ?2",
            params![value.to_rfc3339(), id],
        )?;
        Ok(())
    }

    fn update_end(&self, id: i64, value: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "UPDATE stays SET end_time = ?1 WHERE id = ?2",
            params![value.to_rfc3339(), id],
        )?;
        Ok(())
    }

    fn update_group(&self, id: i64, value: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE stays SET trip_group = ?1 WHERE id = ?2",
            params![value, id],
        )?;
        Ok(())
    }

    fn update_name(&self, id: i64, value: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE stays SET name = ?1 WHERE id = ?2",
            params![value, id],
        )?;
        Ok(())
    }

    fn update_country(&self, id: i64, value: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE stays SET country = ?1 WHERE id = ?2",
            params![value, id],
        )?;
        Ok(())
    }

    fn update_timezone(&self, id: i64, value: i32) -> Result<()> {
        self.conn.execute(
            "UPDATE stays SET timezone_offset = ?1 WHERE id = ?2",
            params![value, id],
        )?;
        Ok(())
    }

    fn set_blog_post(&self, id: i64, url: &str, name: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE stays SET blog_post_url = ?1, blog_post_name = ?2 WHERE id = ?3",
            params![url, name, id],
        )?;
        Ok(())
    }

    fn clear_blog_post(&self, id: i64) -> Result<()> {
        self.conn.execute(
            "UPDATE stays SET blog_post_url = NULL, blog_post_name = NULL WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }

    fn set_map_url(&self, id: i64, url: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE stays SET map_url = ?1 WHERE id = ?2",
            params![url, id],
        )?;
        Ok(())
    }
}

fn row_to_stay(row: &Row<'_>) -> rusqlite::Result<Stay> {
    let start: String = row.get("start_time")?;
    let end: Option<String> = row.get("end_time")?;
    Ok(Stay {
        id: row.get("id")?,
        start: parse_timestamp(&start).map_err(|e| invalid_column(row, "start_time", e))?,
        end: end
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(|e| invalid_column(row, "end_time", e))?,
        group: row.get("trip_group")?,
        name: row.get("name")?,
        country: row.get("country")?,
        timezone_offset: row.get("timezone_offset")?,
        blog_post: blog_post_from(row.get("blog_post_url")?, row.get("blog_post_name")?),
        map_url: row.get("map_url")?,
    })
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc))
}

fn invalid_column(row: &Row<'_>, name: &str, err: chrono::ParseError) -> rusqlite::Error {
    let index = row.as_ref().column_index(name).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        Box::new(err),
    )
}

/// Pair the two blog post columns into a [`BlogPost`], provided both are
/// non-null. A half-written pair reads back as no post at all.
fn blog_post_from(url: Option<String>, name: Option<String>) -> Option<BlogPost> {
    match (url, name) {
        (Some(url), Some(name)) => Some(BlogPost { url, name }),
        _ => None,
    }
}
