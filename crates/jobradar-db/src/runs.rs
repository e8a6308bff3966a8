//! Scrape run bookkeeping.
//!
//! Every pipeline execution gets a row in `scrape_runs` so operators can
//! see when a board was last fetched, how it was triggered, and what it
//! produced.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

/// How a scrape run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunTrigger {
    /// Started by the interval scheduler
    Scheduled,
    /// Started by an API request
    Manual,
}

impl RunTrigger {
    /// Stable string form used in the database.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Manual => "Manual",
        }
    }
}

/// Lifecycle state of a scrape run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Currently executing
    Running,
    /// Finished without a fatal error
    Completed,
    /// Aborted by a fatal error
    Failed,
}

impl RunStatus {
    /// Stable string form used in the database.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

/// Ingestion counters reported by a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    /// Postings inserted as new records
    pub created: i64,
    /// Existing records whose `last_updated` was refreshed
    pub refreshed: i64,
    /// Postings rejected before persistence (incomplete)
    pub skipped: i64,
    /// Postings that hit a persistence error and were skipped
    pub failed: i64,
}

/// A persisted scrape run record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRun {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// How the run was started
    pub trigger: RunTrigger,
    /// Which board was scraped
    pub scope: String,
    /// Current lifecycle state
    pub status: RunStatus,
    /// Ingestion counters, all zero while the run is live
    pub counts: RunCounts,
    /// Fatal error message for failed runs
    pub error: Option<String>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished, if it has
    pub finished_at: Option<DateTime<Utc>>,
}

/// Record the start of a scrape run and return its id.
///
/// # Errors
/// Returns `DatabaseError` if the insert fails.
pub async fn create_run(
    pool: &Pool<Sqlite>,
    trigger: RunTrigger,
    scope: &str,
    started_at: DateTime<Utc>,
) -> Result<String> {
    let id = uuid::Uuid::new_v4().to_string();

    sqlx::query(
        "INSERT INTO scrape_runs (id, trigger_kind, scope, status, started_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(trigger.as_str())
    .bind(scope)
    .bind(RunStatus::Running.as_str())
    .bind(started_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(id)
}

/// Mark a run as completed and store its counters.
///
/// # Errors
/// Returns `DatabaseError::NotFound` if no run has the given id.
pub async fn complete_run(
    pool: &Pool<Sqlite>,
    run_id: &str,
    counts: RunCounts,
    finished_at: DateTime<Utc>,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE scrape_runs
         SET status = ?, created_count = ?, refreshed_count = ?,
             skipped_count = ?, failed_count = ?, finished_at = ?
         WHERE id = ?",
    )
    .bind(RunStatus::Completed.as_str())
    .bind(counts.created)
    .bind(counts.refreshed)
    .bind(counts.skipped)
    .bind(counts.failed)
    .bind(finished_at.to_rfc3339())
    .bind(run_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound);
    }

    Ok(())
}

/// Mark a run as failed with an error message.
///
/// # Errors
/// Returns `DatabaseError::NotFound` if no run has the given id.
pub async fn fail_run(
    pool: &Pool<Sqlite>,
    run_id: &str,
    error: &str,
    finished_at: DateTime<Utc>,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE scrape_runs SET status = ?, error = ?, finished_at = ? WHERE id = ?",
    )
    .bind(RunStatus::Failed.as_str())
    .bind(error)
    .bind(finished_at.to_rfc3339())
    .bind(run_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound);
    }

    Ok(())
}

/// Recent scrape runs, newest first.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn list_recent_runs(pool: &Pool<Sqlite>, limit: i64) -> Result<Vec<ScrapeRun>> {
    let rows = sqlx::query(
        "SELECT id, trigger_kind, scope, status, created_count, refreshed_count,
                skipped_count, failed_count, error, started_at, finished_at
         FROM scrape_runs
         ORDER BY started_at DESC
         LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(parse_run_from_row).collect()
}

fn parse_run_from_row(row: &SqliteRow) -> Result<ScrapeRun> {
    let trigger: String = row.try_get("trigger_kind")?;
    let trigger = match trigger.as_str() {
        "Scheduled" => RunTrigger::Scheduled,
        "Manual" => RunTrigger::Manual,
        other => return Err(DatabaseError::Decode(format!("unknown trigger '{other}'"))),
    };

    let status: String = row.try_get("status")?;
    let status = match status.as_str() {
        "Running" => RunStatus::Running,
        "Completed" => RunStatus::Completed,
        "Failed" => RunStatus::Failed,
        other => return Err(DatabaseError::Decode(format!("unknown status '{other}'"))),
    };

    let started_at: String = row.try_get("started_at")?;
    let started_at = DateTime::parse_from_rfc3339(&started_at)
        .map_err(|e| DatabaseError::Decode(format!("bad started_at: {e}")))?
        .with_timezone(&Utc);

    let finished_at: Option<String> = row.try_get("finished_at")?;
    let finished_at = finished_at
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| DatabaseError::Decode(format!("bad finished_at: {e}")))
        })
        .transpose()?;

    Ok(ScrapeRun {
        id: row.try_get("id")?,
        trigger,
        scope: row.try_get("scope")?,
        status,
        counts: RunCounts {
            created: row.try_get("created_count")?,
            refreshed: row.try_get("refreshed_count")?,
            skipped: row.try_get("skipped_count")?,
            failed: row.try_get("failed_count")?,
        },
        error: row.try_get("error")?,
        started_at,
        finished_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::open_pool;
    use crate::migrations::run_migrations;

    async fn test_pool() -> Pool<Sqlite> {
        let pool = open_pool(":memory:").await.expect("open pool");
        run_migrations(&pool).await.expect("run migrations");
        pool
    }

    #[tokio::test]
    async fn test_run_lifecycle_completed() {
        let pool = test_pool().await;
        let started = Utc::now();

        let id = create_run(&pool, RunTrigger::Manual, "Xing", started)
            .await
            .expect("create run");

        let counts = RunCounts {
            created: 3,
            refreshed: 2,
            skipped: 1,
            failed: 0,
        };
        complete_run(&pool, &id, counts, Utc::now())
            .await
            .expect("complete run");

        let runs = list_recent_runs(&pool, 10).await.expect("list runs");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status, RunStatus::Completed);
        assert_eq!(runs[0].trigger, RunTrigger::Manual);
        assert_eq!(runs[0].scope, "Xing");
        assert_eq!(runs[0].counts, counts);
        assert!(runs[0].finished_at.is_some());
        assert!(runs[0].error.is_none());
    }

    #[tokio::test]
    async fn test_run_lifecycle_failed() {
        let pool = test_pool().await;

        let id = create_run(&pool, RunTrigger::Scheduled, "all", Utc::now())
            .await
            .expect("create run");
        fail_run(&pool, &id, "navigation timed out", Utc::now())
            .await
            .expect("fail run");

        let runs = list_recent_runs(&pool, 10).await.expect("list runs");
        assert_eq!(runs[0].status, RunStatus::Failed);
        assert_eq!(runs[0].error.as_deref(), Some("navigation timed out"));
    }

    #[tokio::test]
    async fn test_complete_missing_run_is_not_found() {
        let pool = test_pool().await;
        let result = complete_run(&pool, "no-such-id", RunCounts::default(), Utc::now()).await;
        assert!(matches!(result, Err(DatabaseError::NotFound)));
    }
}
