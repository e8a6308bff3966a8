//! Scrape orchestration.
//!
//! One run per board: fetch the results page through the browser seam,
//! extract and normalize postings, deduplicate and hand the batch to
//! ingestion, recording the run in the store. A full cycle fans the boards
//! out with bounded concurrency, then merges every board's batch and
//! deduplicates once across the cycle before ingesting; one failing board
//! never takes the cycle down.

use crate::error::{PipelineError, Result};
use crate::ingest::{IngestReport, IngestionPipeline};
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use jobradar_browser::{FetchRequest, Navigator, RenderedPage};
use jobradar_core::{CanonicalPosting, Source};
use jobradar_db::{JobStore, RunTrigger};
use jobradar_extract::{canonicalize, dedup_postings, PostingExtractor};
use jobradar_sources::{SourceDefinition, SourceRegistry};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of scraping one board.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRunReport {
    /// Which board was scraped
    pub source: Source,
    /// Postings accepted by the extractor
    pub extracted: usize,
    /// Postings surviving deduplication
    pub unique: usize,
    /// Ingestion counters
    pub ingest: IngestReport,
}

/// Per-board outcome within a full cycle.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    /// Which board this outcome belongs to
    pub source: Source,
    /// Report when the board succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SourceRunReport>,
    /// Error text when the board failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a full scrape cycle across all boards.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Per-board outcomes in `Source::ALL` order
    pub outcomes: Vec<SourceOutcome>,
    /// Ingestion counters merged across successful boards
    pub totals: IngestReport,
}

/// Fetched and normalized postings for one board, before dedup.
struct CollectedBatch {
    extracted: usize,
    postings: Vec<CanonicalPosting>,
}

/// One board's collection result within a cycle, with its run row.
struct CollectedSource {
    source: Source,
    run_id: Option<String>,
    outcome: Result<CollectedBatch>,
}

/// Drives scrape runs over the browser, extractor and store.
pub struct ScrapeOrchestrator {
    navigator: Arc<dyn Navigator>,
    registry: SourceRegistry,
    store: JobStore,
    ingestion: IngestionPipeline,
    snapshot_dir: PathBuf,
    max_concurrent: usize,
}

impl ScrapeOrchestrator {
    /// Wire an orchestrator from its collaborators.
    #[must_use]
    pub fn new(
        navigator: Arc<dyn Navigator>,
        registry: SourceRegistry,
        store: JobStore,
        snapshot_dir: impl Into<PathBuf>,
        max_concurrent: usize,
    ) -> Self {
        let ingestion = IngestionPipeline::new(store.clone());
        Self {
            navigator,
            registry,
            store,
            ingestion,
            snapshot_dir: snapshot_dir.into(),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Scrape one board and record the run.
    ///
    /// # Errors
    /// Returns error when the board has no definition, the fetch fails
    /// after all retries, or the definition's search URL cannot be parsed.
    /// The run row is marked failed before the error propagates.
    pub async fn run_source(
        &self,
        source: Source,
        trigger: RunTrigger,
    ) -> Result<SourceRunReport> {
        let definition = self.registry.get(source)?;

        let run_id = self
            .store
            .create_run(trigger, source.as_str(), Utc::now())
            .await?;

        let result = async {
            let batch = self.collect_source(&definition).await?;
            let unique = dedup_postings(batch.postings);
            let unique_count = unique.len();
            let ingest = self.ingestion.ingest_batch(&unique, Utc::now()).await;
            Ok::<_, PipelineError>(SourceRunReport {
                source,
                extracted: batch.extracted,
                unique: unique_count,
                ingest,
            })
        }
        .await;

        match result {
            Ok(report) => {
                self.store
                    .complete_run(&run_id, report.ingest.as_run_counts(), Utc::now())
                    .await?;
                info!(
                    source = %source,
                    extracted = report.extracted,
                    created = report.ingest.created,
                    refreshed = report.ingest.refreshed,
                    "scrape run completed"
                );
                Ok(report)
            }
            Err(e) => {
                if let Err(db_err) = self
                    .store
                    .fail_run(&run_id, &e.to_string(), Utc::now())
                    .await
                {
                    warn!(source = %source, error = %db_err, "failed to record run failure");
                }
                Err(e)
            }
        }
    }

    /// Scrape every registered board with bounded concurrency.
    ///
    /// Collection fans out concurrently; the boards' batches are then
    /// merged and deduplicated once across the whole cycle, so a posting
    /// syndicated to several boards is stored a single time (the earliest
    /// board in `Source::ALL` order keeps it). Per-board failures are
    /// logged and reported, never propagated.
    pub async fn run_all(&self, trigger: RunTrigger) -> RunSummary {
        let definitions = self.registry.get_all();
        info!(sources = definitions.len(), "starting full scrape cycle");

        let mut collected: Vec<CollectedSource> = stream::iter(definitions)
            .map(|definition| async move {
                let source = definition.id();
                let run_id = match self
                    .store
                    .create_run(trigger, source.as_str(), Utc::now())
                    .await
                {
                    Ok(id) => Some(id),
                    Err(e) => {
                        return CollectedSource {
                            source,
                            run_id: None,
                            outcome: Err(e.into()),
                        };
                    }
                };

                let outcome = self.collect_source(&definition).await;
                CollectedSource {
                    source,
                    run_id,
                    outcome,
                }
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        // buffer_unordered yields in completion order
        collected.sort_by_key(|c| Source::ALL.iter().position(|s| *s == c.source));

        let merged: Vec<CanonicalPosting> = collected
            .iter()
            .filter_map(|c| c.outcome.as_ref().ok())
            .flat_map(|batch| batch.postings.iter().cloned())
            .collect();

        let mut by_source: HashMap<Source, Vec<CanonicalPosting>> = HashMap::new();
        for posting in dedup_postings(merged) {
            by_source.entry(posting.source).or_default().push(posting);
        }

        let now = Utc::now();
        let mut outcomes = Vec::with_capacity(collected.len());
        let mut totals = IngestReport::default();

        for CollectedSource {
            source,
            run_id,
            outcome,
        } in collected
        {
            match outcome {
                Ok(batch) => {
                    let survivors = by_source.remove(&source).unwrap_or_default();
                    let unique = survivors.len();
                    let ingest = self.ingestion.ingest_batch(&survivors, now).await;

                    if let Some(run_id) = &run_id {
                        if let Err(e) = self
                            .store
                            .complete_run(run_id, ingest.as_run_counts(), Utc::now())
                            .await
                        {
                            warn!(source = %source, error = %e, "failed to record run completion");
                        }
                    }

                    info!(
                        source = %source,
                        extracted = batch.extracted,
                        created = ingest.created,
                        refreshed = ingest.refreshed,
                        "scrape run completed"
                    );
                    totals.merge(&ingest);
                    outcomes.push(SourceOutcome {
                        source,
                        report: Some(SourceRunReport {
                            source,
                            extracted: batch.extracted,
                            unique,
                            ingest,
                        }),
                        error: None,
                    });
                }
                Err(e) => {
                    error!(source = %source, error = %e, "board scrape failed");
                    if let Some(run_id) = &run_id {
                        if let Err(db_err) = self
                            .store
                            .fail_run(run_id, &e.to_string(), Utc::now())
                            .await
                        {
                            warn!(source = %source, error = %db_err, "failed to record run failure");
                        }
                    }
                    outcomes.push(SourceOutcome {
                        source,
                        report: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        info!(
            created = totals.created,
            refreshed = totals.refreshed,
            failed_sources = outcomes.iter().filter(|o| o.error.is_some()).count(),
            "full scrape cycle finished"
        );

        RunSummary { outcomes, totals }
    }

    /// Fetch and normalize one board's postings, without ingesting them.
    async fn collect_source(&self, definition: &SourceDefinition) -> Result<CollectedBatch> {
        let source = definition.id();
        let extractor = PostingExtractor::new(definition)?;

        let request = FetchRequest {
            url: definition.search_url().to_string(),
            accept_language: definition.source.locale.accept_language().to_string(),
        };

        info!(source = %source, url = %request.url, "fetching results page");
        let page = self.navigator.fetch(&request).await?;

        let raw = extractor.extract(page.html());

        // An empty result means the markup no longer looks like what we
        // expect; keep the evidence.
        if raw.is_empty() {
            self.snapshot_page(page.as_ref(), source).await;
        }

        if let Err(e) = page.close().await {
            debug!(source = %source, error = %e, "page teardown failed");
        }

        let extracted = raw.len();
        let now = Utc::now();
        let postings: Vec<CanonicalPosting> = raw
            .into_iter()
            .map(|posting| canonicalize(posting, &definition.date_phrases, now))
            .collect();

        Ok(CollectedBatch {
            extracted,
            postings,
        })
    }

    async fn snapshot_page(&self, page: &dyn RenderedPage, source: Source) {
        let filename = format!(
            "{}-{}.png",
            source.as_str().to_lowercase(),
            Utc::now().format("%Y%m%d-%H%M%S")
        );
        let path = self.snapshot_dir.join(filename);

        match page.snapshot(&path).await {
            Ok(()) => {
                warn!(
                    source = %source,
                    path = %path.display(),
                    "no postings extracted, wrote diagnostic snapshot"
                );
            }
            Err(e) => {
                warn!(source = %source, error = %e, "failed to write diagnostic snapshot");
            }
        }
    }
}
