//! Job posting persistence.
//!
//! The `jobs` table is reconciled on the (title, company, url) key: new
//! postings are inserted, re-seen postings only get their `last_updated`
//! stamp refreshed. Timestamps are stored as RFC 3339 text.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use jobradar_core::{CanonicalPosting, GermanLevel, Source};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

/// Experience level stamped on every record this scraper creates.
pub const DEFAULT_EXPERIENCE_LEVEL: &str = "Junior";

/// A persisted job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredJob {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Job title as displayed on the board
    pub title: String,
    /// Hiring company
    pub company: String,
    /// Location text
    pub location: String,
    /// Absolute posting URL
    pub url: String,
    /// Board the posting came from
    pub source: Source,
    /// Experience level; this scraper only creates `"Junior"` records
    pub experience_level: String,
    /// German language requirement; starts at `Unknown`
    pub german_level: GermanLevel,
    /// When this scraper first saw the posting
    pub posted_at: DateTime<Utc>,
    /// Last time this posting was seen by a scrape run
    pub last_updated: DateTime<Utc>,
}

/// Whether an error is a unique-constraint violation on insert.
///
/// Two runs racing on the same posting both pass `find_by_key`; the loser
/// of the insert race lands here and is treated as "already exists".
#[must_use]
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db_err) if db_err.is_unique_violation()
    )
}

/// Look a posting up by its reconciliation key.
///
/// All three columns must match exactly.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn find_by_key(
    pool: &Pool<Sqlite>,
    title: &str,
    company: &str,
    url: &str,
) -> Result<Option<StoredJob>> {
    let row = sqlx::query(
        "SELECT id, title, company, location, url, source,
                experience_level, german_level, posted_at, last_updated
         FROM jobs
         WHERE title = ? AND company = ? AND url = ?",
    )
    .bind(title)
    .bind(company)
    .bind(url)
    .fetch_optional(pool)
    .await?;

    row.map(|r| parse_job_from_row(&r)).transpose()
}

/// Insert a new job record.
///
/// Defaults are stamped here: experience level `Junior`, german level
/// `Unknown`, and `posted_at = last_updated = now`. The record tracks
/// when this scraper first saw the posting, not the board's own date.
///
/// # Errors
/// Returns `DatabaseError` if the insert fails; use [`is_unique_violation`]
/// on the underlying error to detect the insert race.
pub async fn create_job(
    pool: &Pool<Sqlite>,
    posting: &CanonicalPosting,
    now: DateTime<Utc>,
) -> Result<StoredJob> {
    let id = uuid::Uuid::new_v4().to_string();
    let german_level = GermanLevel::default();

    sqlx::query(
        "INSERT INTO jobs (id, title, company, location, url, source,
                           experience_level, german_level, posted_at, last_updated)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&posting.title)
    .bind(&posting.company)
    .bind(&posting.location)
    .bind(&posting.url)
    .bind(posting.source.as_str())
    .bind(DEFAULT_EXPERIENCE_LEVEL)
    .bind(german_level.as_str())
    .bind(now.to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(StoredJob {
        id,
        title: posting.title.clone(),
        company: posting.company.clone(),
        location: posting.location.clone(),
        url: posting.url.clone(),
        source: posting.source,
        experience_level: DEFAULT_EXPERIENCE_LEVEL.to_string(),
        german_level,
        posted_at: now,
        last_updated: now,
    })
}

/// Refresh the `last_updated` stamp of an existing record.
///
/// Nothing else changes; `posted_at` keeps its original value.
///
/// # Errors
/// Returns `DatabaseError::NotFound` if no record has the given id.
pub async fn touch_last_updated(
    pool: &Pool<Sqlite>,
    job_id: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let result = sqlx::query("UPDATE jobs SET last_updated = ? WHERE id = ?")
        .bind(now.to_rfc3339())
        .bind(job_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound);
    }

    Ok(())
}

/// All stored jobs, most recently seen first.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn list_all(pool: &Pool<Sqlite>) -> Result<Vec<StoredJob>> {
    let rows = sqlx::query(
        "SELECT id, title, company, location, url, source,
                experience_level, german_level, posted_at, last_updated
         FROM jobs
         ORDER BY last_updated DESC",
    )
    .fetch_all(pool)
    .await?;

    parse_jobs_from_rows(&rows)
}

/// Stored jobs for one board, most recently seen first.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn list_by_source(pool: &Pool<Sqlite>, source: Source) -> Result<Vec<StoredJob>> {
    let rows = sqlx::query(
        "SELECT id, title, company, location, url, source,
                experience_level, german_level, posted_at, last_updated
         FROM jobs
         WHERE source = ?
         ORDER BY last_updated DESC",
    )
    .bind(source.as_str())
    .fetch_all(pool)
    .await?;

    parse_jobs_from_rows(&rows)
}

/// Total number of stored jobs.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn count_jobs(pool: &Pool<Sqlite>) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs")
        .fetch_one(pool)
        .await?;

    Ok(count)
}

fn parse_jobs_from_rows(rows: &[SqliteRow]) -> Result<Vec<StoredJob>> {
    rows.iter().map(parse_job_from_row).collect()
}

fn parse_job_from_row(row: &SqliteRow) -> Result<StoredJob> {
    let source: String = row.try_get("source")?;
    let source: Source = source
        .parse()
        .map_err(|_| DatabaseError::Decode(format!("unknown source '{source}'")))?;

    let german_level: String = row.try_get("german_level")?;
    let german_level: GermanLevel = german_level
        .parse()
        .map_err(|_| DatabaseError::Decode(format!("unknown german level '{german_level}'")))?;

    let posted_at: String = row.try_get("posted_at")?;
    let posted_at = DateTime::parse_from_rfc3339(&posted_at)
        .map_err(|e| DatabaseError::Decode(format!("bad posted_at: {e}")))?
        .with_timezone(&Utc);

    let last_updated: String = row.try_get("last_updated")?;
    let last_updated = DateTime::parse_from_rfc3339(&last_updated)
        .map_err(|e| DatabaseError::Decode(format!("bad last_updated: {e}")))?
        .with_timezone(&Utc);

    Ok(StoredJob {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        company: row.try_get("company")?,
        location: row.try_get("location")?,
        url: row.try_get("url")?,
        source,
        experience_level: row.try_get("experience_level")?,
        german_level,
        posted_at,
        last_updated,
    })
}
