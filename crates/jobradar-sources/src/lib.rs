//! Source definitions for the jobradar scraper.
//!
//! Everything board-specific lives here as data: search URLs, selector
//! strategies, field sub-selectors, relevance vocabularies and posted-date
//! phrase tables. The scraper itself stays generic over these definitions.
//!
//! # Modules
//!
//! - [`definition`] - The TOML-backed definition model
//! - [`loader`] - Loading definitions from the `source-definitions/` directory
//! - [`registry`] - In-memory lookup by [`jobradar_core::Source`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod definition;
pub mod error;
pub mod loader;
pub mod registry;

pub use definition::{
    DatePhrase, FieldSelectors, Locale, RelevanceVocabulary, SelectorStrategy, SourceDefinition,
    SourceMetadata,
};
pub use error::{Result, SourceError};
pub use loader::SourceLoader;
pub use registry::SourceRegistry;
