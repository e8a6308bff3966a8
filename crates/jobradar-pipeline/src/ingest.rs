//! Ingestion of canonical postings into the store.
//!
//! Reconciliation is keyed on (title, company, url): unseen postings become
//! new records, re-seen postings only get their `last_updated` stamp
//! refreshed. One bad posting never aborts the batch; persistence failures
//! are logged and counted, then the batch moves on.

use chrono::{DateTime, Utc};
use jobradar_core::CanonicalPosting;
use jobradar_db::{is_unique_violation, DatabaseError, JobStore, RunCounts};
use serde::Serialize;
use tracing::{debug, error};

/// Outcome counters for one ingested batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Postings inserted as new records
    pub created: usize,
    /// Existing records whose `last_updated` was refreshed
    pub refreshed: usize,
    /// Postings rejected by the validity gate
    pub skipped_invalid: usize,
    /// Postings that hit a persistence error and were skipped
    pub failed: usize,
}

impl IngestReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: &IngestReport) {
        self.created += other.created;
        self.refreshed += other.refreshed;
        self.skipped_invalid += other.skipped_invalid;
        self.failed += other.failed;
    }

    /// Convert to the run-bookkeeping counter form.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn as_run_counts(&self) -> RunCounts {
        RunCounts {
            created: self.created as i64,
            refreshed: self.refreshed as i64,
            skipped: self.skipped_invalid as i64,
            failed: self.failed as i64,
        }
    }
}

/// Writes scraped postings into the job store.
#[derive(Clone)]
pub struct IngestionPipeline {
    store: JobStore,
}

impl IngestionPipeline {
    /// Create a pipeline writing into the given store.
    #[must_use]
    pub fn new(store: JobStore) -> Self {
        Self { store }
    }

    /// Ingest a batch of postings, reconciling each against the store.
    ///
    /// Never fails as a whole: per-posting errors are logged, counted and
    /// skipped. Running the same batch twice yields the same stored state,
    /// with the second run only refreshing timestamps.
    pub async fn ingest_batch(
        &self,
        postings: &[CanonicalPosting],
        now: DateTime<Utc>,
    ) -> IngestReport {
        let mut report = IngestReport::default();

        for posting in postings {
            if !posting.is_complete() {
                debug!(
                    source = %posting.source,
                    title = %posting.title,
                    "skipping incomplete posting"
                );
                report.skipped_invalid += 1;
                continue;
            }

            match self.ingest_one(posting, now).await {
                Ok(IngestOutcome::Created) => report.created += 1,
                Ok(IngestOutcome::Refreshed) => report.refreshed += 1,
                Err(e) => {
                    error!(
                        source = %posting.source,
                        title = %posting.title,
                        company = %posting.company,
                        error = %e,
                        "failed to persist posting, skipping"
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }

    async fn ingest_one(
        &self,
        posting: &CanonicalPosting,
        now: DateTime<Utc>,
    ) -> jobradar_db::Result<IngestOutcome> {
        if let Some(existing) = self
            .store
            .find_by_key(&posting.title, &posting.company, &posting.url)
            .await?
        {
            self.store.touch_last_updated(&existing.id, now).await?;
            return Ok(IngestOutcome::Refreshed);
        }

        match self.store.create_job(posting, now).await {
            Ok(_) => Ok(IngestOutcome::Created),
            // Lost an insert race against a concurrent run; the record
            // exists now, so treat it as a refresh.
            Err(DatabaseError::Sqlx(e)) if is_unique_violation(&e) => {
                let existing = self
                    .store
                    .find_by_key(&posting.title, &posting.company, &posting.url)
                    .await?
                    .ok_or(DatabaseError::NotFound)?;
                self.store.touch_last_updated(&existing.id, now).await?;
                Ok(IngestOutcome::Refreshed)
            }
            Err(e) => Err(e),
        }
    }
}

enum IngestOutcome {
    Created,
    Refreshed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobradar_core::Source;

    fn posting(title: &str, company: &str, url: &str) -> CanonicalPosting {
        CanonicalPosting {
            title: title.to_string(),
            company: company.to_string(),
            location: "Hamburg".to_string(),
            url: url.to_string(),
            source: Source::StepStone,
            posted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_new_postings_are_created() {
        let store = JobStore::in_memory().await.expect("open store");
        let pipeline = IngestionPipeline::new(store.clone());

        let batch = vec![
            posting("Junior Dev", "Acme", "https://s.example/1"),
            posting("Junior QA", "Beta", "https://s.example/2"),
        ];
        let report = pipeline.ingest_batch(&batch, Utc::now()).await;

        assert_eq!(report.created, 2);
        assert_eq!(report.refreshed, 0);
        assert_eq!(store.count_jobs().await.expect("count"), 2);
    }

    #[tokio::test]
    async fn test_reingest_refreshes_instead_of_duplicating() {
        let store = JobStore::in_memory().await.expect("open store");
        let pipeline = IngestionPipeline::new(store.clone());

        let batch = vec![posting("Junior Dev", "Acme", "https://s.example/1")];
        let first = pipeline.ingest_batch(&batch, Utc::now()).await;
        let second = pipeline.ingest_batch(&batch, Utc::now()).await;

        assert_eq!(first.created, 1);
        assert_eq!(second.created, 0);
        assert_eq!(second.refreshed, 1);
        assert_eq!(store.count_jobs().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn test_incomplete_posting_is_skipped() {
        let store = JobStore::in_memory().await.expect("open store");
        let pipeline = IngestionPipeline::new(store.clone());

        let mut bad = posting("Junior Dev", "Acme", "https://s.example/1");
        bad.company = String::new();
        let report = pipeline
            .ingest_batch(&[bad, posting("Junior QA", "Beta", "https://s.example/2")], Utc::now())
            .await;

        assert_eq!(report.skipped_invalid, 1);
        assert_eq!(report.created, 1);
        assert_eq!(store.count_jobs().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn test_refresh_only_touches_last_updated() {
        let store = JobStore::in_memory().await.expect("open store");
        let pipeline = IngestionPipeline::new(store.clone());

        let original = posting("Junior Dev", "Acme", "https://s.example/1");
        let first = Utc::now();
        pipeline
            .ingest_batch(std::slice::from_ref(&original), first)
            .await;

        let later = first + chrono::Duration::hours(6);
        pipeline.ingest_batch(&[original.clone()], later).await;

        let stored = store
            .find_by_key(&original.title, &original.company, &original.url)
            .await
            .expect("find")
            .expect("present");
        assert_eq!(stored.last_updated.timestamp(), later.timestamp());
        // posted_at keeps its first-seen stamp
        assert_eq!(stored.posted_at.timestamp(), first.timestamp());
    }

    #[test]
    fn test_report_merge() {
        let mut total = IngestReport {
            created: 1,
            refreshed: 2,
            skipped_invalid: 0,
            failed: 1,
        };
        total.merge(&IngestReport {
            created: 2,
            refreshed: 0,
            skipped_invalid: 3,
            failed: 0,
        });

        assert_eq!(total.created, 3);
        assert_eq!(total.refreshed, 2);
        assert_eq!(total.skipped_invalid, 3);
        assert_eq!(total.failed, 1);

        let counts = total.as_run_counts();
        assert_eq!(counts.created, 3);
        assert_eq!(counts.skipped, 3);
    }
}
