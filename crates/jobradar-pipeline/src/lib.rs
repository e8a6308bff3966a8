//! Scrape pipeline for jobradar.
//!
//! Wires the browser, extractor and store together: the orchestrator runs
//! one board end to end (fetch, extract, normalize, deduplicate, ingest)
//! and fans a full cycle out over all boards; the scheduler repeats full
//! cycles on a fixed cadence behind a single-flight guard.
//!
//! # Modules
//!
//! - [`ingest`] - Reconciling postings against the store
//! - [`orchestrator`] - Per-board runs and bounded full cycles
//! - [`scheduler`] - Interval ticking with pre-flight store probe
//! - [`guard`] - At-most-one-cycle guard shared with manual triggers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod guard;
pub mod ingest;
pub mod orchestrator;
pub mod scheduler;

pub use error::{PipelineError, Result};
pub use guard::{RunGuard, RunPermit};
pub use ingest::{IngestReport, IngestionPipeline};
pub use orchestrator::{RunSummary, ScrapeOrchestrator, SourceOutcome, SourceRunReport};
pub use scheduler::Scheduler;
