//! Loader that merges property sources by priority.

use crate::core::PropertyStore;
use crate::error::{ConfigError, Result};
use crate::sources::PropertySource;

/// Loads and merges properties from multiple sources.
///
/// Sources are merged in priority order (lower priority first, higher
/// priority sources override). Sources with equal priority merge in the order
/// they were added.
pub struct PropertyLoader {
    sources: Vec<Box<dyn PropertySource>>,
}

impl PropertyLoader {
    /// Create a new loader with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Add a property source.
    pub fn add_source(&mut self, source: Box<dyn PropertySource>) {
        self.sources.push(source);
    }

    /// Returns `true` if no sources were added.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Load and merge every source into a single store.
    ///
    /// # Errors
    ///
    /// Returns an error if no sources were added or any source fails to load.
    pub fn load(&self) -> Result<PropertyStore> {
        if self.sources.is_empty() {
            return Err(ConfigError::Other(
                "No property sources specified".to_string(),
            ));
        }

        let mut store = PropertyStore::new();
        for source in self.sorted() {
            let values = source.load()?;
            tracing::debug!(
                source = %source.name(),
                priority = source.priority(),
                keys = values.len(),
                "merged property source"
            );
            store.extend(values);
        }

        Ok(store)
    }

    /// Get the list of source names in merge order.
    pub fn source_names(&self) -> Vec<String> {
        self.sorted().iter().map(|s| s.name()).collect()
    }

    fn sorted(&self) -> Vec<&dyn PropertySource> {
        let mut sorted: Vec<&dyn PropertySource> = self.sources.iter().map(|s| s.as_ref()).collect();
        // Stable, so equal priorities keep insertion order.
        sorted.sort_by_key(|s| s.priority());
        sorted
    }
}

impl Default for PropertyLoader {
    fn default() -> Self {
        Self::new()
    }
}


impl std::fmt::Debug for PropertyLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyLoader")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
