//! Jobradar Core - Foundation crate for the jobradar ingestion service.
//!
//! This crate provides the shared domain types, error handling and
//! configuration management that all other jobradar crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared domain types (`Source`, `RawPosting`, `CanonicalPosting`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, DatabaseConfig, SchedulerConfig, ScrapingConfig, ServerConfig,
};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use types::{CanonicalPosting, GermanLevel, RawPosting, Source};
