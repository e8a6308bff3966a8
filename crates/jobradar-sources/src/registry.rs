//! In-memory source definition registry.

use crate::{
    definition::SourceDefinition,
    error::{Result, SourceError},
    loader::SourceLoader,
};
use jobradar_core::Source;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// In-memory cache of source definitions.
///
/// Loaded once at startup from the definitions directory; the orchestrator
/// looks definitions up by source on every run.
#[derive(Clone)]
pub struct SourceRegistry {
    /// Cached definitions, indexed by source
    definitions: Arc<RwLock<HashMap<Source, SourceDefinition>>>,
}

impl SourceRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            definitions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a registry and load all definitions from the given loader.
    ///
    /// # Errors
    /// Returns error if loading fails.
    pub fn load_from(loader: &SourceLoader) -> Result<Self> {
        let registry = Self::new();
        registry.reload(loader)?;
        Ok(registry)
    }

    /// Reload all definitions from the loader, replacing the current cache.
    ///
    /// # Errors
    /// Returns error if loading fails.
    pub fn reload(&self, loader: &SourceLoader) -> Result<()> {
        let definitions = loader.load_all()?;

        let mut cache = self
            .definitions
            .write()
            .expect("acquire write lock on definitions");

        cache.clear();

        for definition in definitions {
            cache.insert(definition.id(), definition);
        }

        info!(count = cache.len(), "reloaded source definitions");

        Ok(())
    }

    /// Get the definition for a source.
    ///
    /// # Errors
    /// Returns error if no definition is registered for the source.
    pub fn get(&self, source: Source) -> Result<SourceDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache
            .get(&source)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                name: source.to_string(),
            })
    }

    /// Get all registered definitions, in `Source::ALL` order.
    #[must_use]
    pub fn get_all(&self) -> Vec<SourceDefinition> {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        Source::ALL
            .iter()
            .filter_map(|source| cache.get(source).cloned())
            .collect()
    }

    /// Whether a definition is registered for the source.
    #[must_use]
    pub fn contains(&self, source: Source) -> bool {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache.contains_key(&source)
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn count(&self) -> usize {
        let cache = self
            .definitions
            .read()
            .expect("acquire read lock on definitions");

        cache.len()
    }

    /// Add or replace a definition in the registry.
    ///
    /// # Errors
    /// Returns error if the definition fails validation.
    pub fn insert(&self, definition: SourceDefinition) -> Result<()> {
        definition.validate()?;

        let mut cache = self
            .definitions
            .write()
            .expect("acquire write lock on definitions");

        let source = definition.id();
        cache.insert(source, definition);

        debug!(source = %source, "inserted source definition");

        Ok(())
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
