//! Pipeline error types.

use thiserror::Error;

/// Errors surfaced by the scrape pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source definition lookup or validation failed.
    #[error("source error: {0}")]
    Source(#[from] jobradar_sources::SourceError),

    /// The browser fetch failed after all retries.
    #[error("browser error: {0}")]
    Browser(#[from] jobradar_browser::BrowserError),

    /// A configured selector could not be parsed.
    #[error("extraction error: {0}")]
    Extract(#[from] jobradar_extract::ExtractError),

    /// Persistence failed at the run level.
    #[error("database error: {0}")]
    Database(#[from] jobradar_db::DatabaseError),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
