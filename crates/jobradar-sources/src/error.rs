//! Error types for source definition handling.

use thiserror::Error;

/// Errors that can occur when loading or validating source definitions.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Definitions directory doesn't exist
    #[error("definitions directory not found: {path}")]
    DirectoryNotFound {
        /// Path that was checked
        path: String,
    },

    /// No definition for the requested source
    #[error("no definition for source: {name}")]
    NotFound {
        /// Source name
        name: String,
    },

    /// Failed to read a definition file
    #[error("failed to load definition from {path}: {source}")]
    LoadError {
        /// File path
        path: String,
        /// Underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse a definition file as TOML
    #[error("failed to parse definition at {path}: {source}")]
    ParseError {
        /// File path
        path: String,
        /// TOML parse error
        #[source]
        source: toml::de::Error,
    },

    /// Definition failed validation
    #[error("invalid definition: {reason}")]
    Invalid {
        /// What was wrong
        reason: String,
    },

    /// I/O error walking the definitions directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for source definition operations.
pub type Result<T> = std::result::Result<T, SourceError>;
