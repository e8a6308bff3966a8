//! Jobradar Database Layer
//!
//! Provides `SQLite` persistence for job postings and scrape run history.
//! Uses `SQLx` with embedded, versioned migrations.
//!
//! # Architecture
//!
//! - **Jobs**: one row per posting, reconciled on the (title, company, url) key
//! - **Scrape runs**: one row per pipeline execution with ingestion counters
//! - **Migrations**: SQL migrations are embedded and run on startup
//! - **Pooling**: WAL-mode pool, 5 connections (1 for in-memory databases)
//!
//! # Example
//!
//! ```ignore
//! use jobradar_db::JobStore;
//!
//! let store = JobStore::open("jobradar.db").await?;
//! let jobs = store.list_all().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod jobs;
pub mod migrations;
pub mod runs;

pub use error::{DatabaseError, Result};
pub use jobs::{is_unique_violation, StoredJob, DEFAULT_EXPERIENCE_LEVEL};
pub use runs::{RunCounts, RunStatus, RunTrigger, ScrapeRun};

use chrono::{DateTime, Utc};
use jobradar_core::{CanonicalPosting, Source};
use sqlx::{Pool, Sqlite};
use std::path::Path;

/// High-level store interface over the `SQLite` pool.
///
/// Cheap to clone; all clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct JobStore {
    pool: Pool<Sqlite>,
}

impl JobStore {
    /// Open (or create) the store at the given path and bring the schema
    /// up to date.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened or a
    /// migration fails.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let pool = connection::open_pool(path).await?;
        migrations::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Open an in-memory store with migrations applied. Used in tests.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the pool cannot be created.
    pub async fn in_memory() -> Result<Self> {
        Self::open(":memory:").await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Check that the store is reachable.
    ///
    /// The scheduler calls this before every tick and skips the cycle when
    /// it fails.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the probe query fails.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Look a posting up by its reconciliation key.
    pub async fn find_by_key(
        &self,
        title: &str,
        company: &str,
        url: &str,
    ) -> Result<Option<StoredJob>> {
        jobs::find_by_key(&self.pool, title, company, url).await
    }

    /// Insert a new job record with default experience and german levels.
    pub async fn create_job(
        &self,
        posting: &CanonicalPosting,
        now: DateTime<Utc>,
    ) -> Result<StoredJob> {
        jobs::create_job(&self.pool, posting, now).await
    }

    /// Refresh the `last_updated` stamp of an existing record.
    pub async fn touch_last_updated(&self, job_id: &str, now: DateTime<Utc>) -> Result<()> {
        jobs::touch_last_updated(&self.pool, job_id, now).await
    }

    /// All stored jobs, most recently seen first.
    pub async fn list_all(&self) -> Result<Vec<StoredJob>> {
        jobs::list_all(&self.pool).await
    }

    /// Stored jobs for one board, most recently seen first.
    pub async fn list_by_source(&self, source: Source) -> Result<Vec<StoredJob>> {
        jobs::list_by_source(&self.pool, source).await
    }

    /// Total number of stored jobs.
    pub async fn count_jobs(&self) -> Result<i64> {
        jobs::count_jobs(&self.pool).await
    }

    /// Record the start of a scrape run and return its id.
    pub async fn create_run(
        &self,
        trigger: RunTrigger,
        scope: &str,
        started_at: DateTime<Utc>,
    ) -> Result<String> {
        runs::create_run(&self.pool, trigger, scope, started_at).await
    }

    /// Mark a run as completed and store its counters.
    pub async fn complete_run(
        &self,
        run_id: &str,
        counts: RunCounts,
        finished_at: DateTime<Utc>,
    ) -> Result<()> {
        runs::complete_run(&self.pool, run_id, counts, finished_at).await
    }

    /// Mark a run as failed with an error message.
    pub async fn fail_run(
        &self,
        run_id: &str,
        error: &str,
        finished_at: DateTime<Utc>,
    ) -> Result<()> {
        runs::fail_run(&self.pool, run_id, error, finished_at).await
    }

    /// Recent scrape runs, newest first.
    pub async fn list_recent_runs(&self, limit: i64) -> Result<Vec<ScrapeRun>> {
        runs::list_recent_runs(&self.pool, limit).await
    }

    /// Close the pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory_runs_migrations() {
        let store = JobStore::in_memory().await.expect("open store");

        let version = migrations::get_schema_version(store.pool())
            .await
            .expect("get version");
        assert_eq!(version, 2);

        store.ping().await.expect("ping store");
    }

    #[tokio::test]
    async fn test_store_is_empty_on_creation() {
        let store = JobStore::in_memory().await.expect("open store");

        assert_eq!(store.count_jobs().await.expect("count"), 0);
        assert!(store.list_all().await.expect("list").is_empty());
    }
}
