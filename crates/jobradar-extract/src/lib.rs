//! Extraction stage of the jobradar pipeline.
//!
//! Turns the settled HTML of a board's results page into clean
//! [`jobradar_core::CanonicalPosting`] values: selector-cascade extraction,
//! relevance filtering, posted-date normalization and in-batch
//! deduplication. Everything here is pure over its inputs; the browser and
//! the store live elsewhere.

pub mod dates;
pub mod dedup;
pub mod error;
pub mod extractor;
pub mod relevance;

pub use dates::{canonicalize, normalize_posted};
pub use dedup::dedup_postings;
pub use error::{ExtractError, Result};
pub use extractor::PostingExtractor;
pub use relevance::RelevanceFilter;
