//! Source definition loading from TOML files.
//!
//! Definitions live in the `source-definitions/` directory at the workspace
//! root; one file per board.

use crate::{
    definition::SourceDefinition,
    error::{Result, SourceError},
};
use jobradar_core::Source;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Loader for source definitions from TOML files.
pub struct SourceLoader {
    /// Base directory containing source definitions
    definitions_dir: PathBuf,
}

impl SourceLoader {
    /// Create a new loader with the given definitions directory.
    ///
    /// # Errors
    /// Returns error if the directory doesn't exist.
    pub fn new(definitions_dir: impl Into<PathBuf>) -> Result<Self> {
        let definitions_dir = definitions_dir.into();

        if !definitions_dir.is_dir() {
            return Err(SourceError::DirectoryNotFound {
                path: definitions_dir.display().to_string(),
            });
        }

        Ok(Self { definitions_dir })
    }

    /// Create a loader using the default definitions directory.
    ///
    /// Looks for `source-definitions/` relative to the workspace root.
    ///
    /// # Errors
    /// Returns error if the default directory doesn't exist.
    pub fn with_default_dir() -> Result<Self> {
        // Find workspace root by looking for Cargo.toml with [workspace]
        let mut current_dir = std::env::current_dir()?;

        loop {
            let cargo_toml = current_dir.join("Cargo.toml");
            if cargo_toml.exists() {
                if let Ok(contents) = std::fs::read_to_string(&cargo_toml) {
                    if contents.contains("[workspace]") {
                        let definitions_dir = current_dir.join("source-definitions");
                        return Self::new(definitions_dir);
                    }
                }
            }

            if let Some(parent) = current_dir.parent() {
                current_dir = parent.to_path_buf();
            } else {
                break;
            }
        }

        // Fallback: try relative path
        Self::new(PathBuf::from("source-definitions"))
    }

    /// Load the definition for a single source.
    ///
    /// Expects a file named after the lowercased source, e.g. `xing.toml`.
    ///
    /// # Errors
    /// Returns error if the file doesn't exist, can't be read, or is invalid.
    pub fn load(&self, source: Source) -> Result<SourceDefinition> {
        let filename = format!("{}.toml", source.as_str().to_lowercase());
        let path = self.definitions_dir.join(&filename);

        if !path.exists() {
            return Err(SourceError::NotFound {
                name: source.to_string(),
            });
        }

        let definition = Self::load_from_path(&path)?;
        definition.validate()?;

        debug!(source = %source, path = %path.display(), "loaded source definition");

        Ok(definition)
    }

    /// Load all source definitions from the definitions directory.
    ///
    /// Invalid definitions are logged as warnings and skipped; one broken
    /// file never takes down the rest.
    ///
    /// # Errors
    /// Returns error if the directory can't be read.
    pub fn load_all(&self) -> Result<Vec<SourceDefinition>> {
        let mut definitions = Vec::new();

        for entry in std::fs::read_dir(&self.definitions_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                continue;
            }

            match Self::load_from_path(&path) {
                Ok(definition) => {
                    if let Err(e) = definition.validate() {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "skipping invalid source definition"
                        );
                        continue;
                    }
                    definitions.push(definition);
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load source definition"
                    );
                }
            }
        }

        info!(
            count = definitions.len(),
            dir = %self.definitions_dir.display(),
            "loaded source definitions"
        );

        Ok(definitions)
    }

    /// Load a source definition from a specific file path.
    fn load_from_path(path: &Path) -> Result<SourceDefinition> {
        let contents = std::fs::read_to_string(path).map_err(|e| SourceError::LoadError {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        toml::from_str(&contents).map_err(|e| SourceError::ParseError {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_definition_file(dir: &Path, filename: &str) -> PathBuf {
        let file_path = dir.join(filename);

        let content = r#"
[source]
id = "Xing"
name = "Xing"
search_url = "https://www.xing.com/jobs/search?keywords=junior+developer+nodejs"
locale = "de"

[[strategies]]
name = "job-card"
item = "article[data-testid=\"job-card\"]"

[fields]
title = ["h2", ".title"]
company = [".company"]
location = [".location"]
url = ["a"]
posted = ["time"]

[relevance]
enabled = true
seniority = ["junior", "einsteiger"]
technology = ["node", "nodejs"]

[[date_phrases]]
contains = "heute"
days_ago = 0

[[date_phrases]]
contains = "gestern"
days_ago = 1
"#;

        std::fs::write(&file_path, content).expect("write test file");
        file_path
    }

    #[test]
    fn test_loader_new_with_existing_dir() {
        let temp_dir = TempDir::new().expect("create temp dir");
        assert!(SourceLoader::new(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_loader_new_with_nonexistent_dir() {
        let loader = SourceLoader::new("/nonexistent/path/to/definitions");
        assert!(matches!(
            loader,
            Err(SourceError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_load_single_source() {
        let temp_dir = TempDir::new().expect("create temp dir");
        write_definition_file(temp_dir.path(), "xing.toml");

        let loader = SourceLoader::new(temp_dir.path()).expect("create loader");
        let definition = loader.load(Source::Xing).expect("load definition");

        assert_eq!(definition.id(), Source::Xing);
        assert_eq!(definition.strategies.len(), 1);
        assert_eq!(definition.strategies[0].name, "job-card");
        assert_eq!(definition.date_phrases.len(), 2);
    }

    #[test]
    fn test_load_missing_source() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let loader = SourceLoader::new(temp_dir.path()).expect("create loader");

        let result = loader.load(Source::StepStone);
        assert!(matches!(result, Err(SourceError::NotFound { .. })));
    }

    #[test]
    fn test_load_all_skips_invalid() {
        let temp_dir = TempDir::new().expect("create temp dir");
        write_definition_file(temp_dir.path(), "xing.toml");

        let invalid_path = temp_dir.path().join("broken.toml");
        std::fs::write(&invalid_path, "not valid toml [[[").expect("write invalid file");

        let loader = SourceLoader::new(temp_dir.path()).expect("create loader");
        let definitions = loader.load_all().expect("load all definitions");

        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].id(), Source::Xing);
    }

    #[test]
    fn test_load_all_ignores_non_toml() {
        let temp_dir = TempDir::new().expect("create temp dir");
        write_definition_file(temp_dir.path(), "xing.toml");
        std::fs::write(temp_dir.path().join("notes.txt"), "not a definition")
            .expect("write text file");

        let loader = SourceLoader::new(temp_dir.path()).expect("create loader");
        let definitions = loader.load_all().expect("load all definitions");

        assert_eq!(definitions.len(), 1);
    }
}
