//! Per-name cache of single properties files.

use super::directory::{PROPERTIES_EXT, load_file};
use crate::core::PropertyStore;
use crate::error::{ConfigError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Loads `<dir>/<name>.properties` on first request and reuses it afterwards.
///
/// Used for files that are read on their own rather than merged into the
/// main store, such as a `DBConfig` file selected per environment.
///
/// # Examples
///
/// ```rust,no_run
/// use harness_config::sources::NamedFileCache;
///
/// let cache = NamedFileCache::new("src/test/resources/ApplicationFiles/ConfigFiles");
/// let db = cache.get("DBConfig")?;
/// let url = db.get("dbUrl_Stage");
/// # Ok::<(), harness_config::error::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct NamedFileCache {
    dir: PathBuf,
    files: Mutex<HashMap<String, Arc<PropertyStore>>>,
}

impl NamedFileCache {
    /// Create an empty cache rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: Mutex::new(HashMap::new()),
        }
    }

    /// The directory files are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the store for `name`, loading it the first time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigurationMissing`] if the file does not exist.
    pub fn get(&self, name: &str) -> Result<Arc<PropertyStore>> {
        let mut files = self.files.lock();
        if let Some(store) = files.get(name) {
            return Ok(Arc::clone(store));
        }

        let path = self.dir.join(format!("{name}.{PROPERTIES_EXT}"));
        if !path.is_file() {
            return Err(ConfigError::missing(
                path,
                format!("'{name}.{PROPERTIES_EXT}' was not found in the properties folder"),
            ));
        }

        let store = Arc::new(PropertyStore::from(load_file(&path)?));
        tracing::debug!(name, file = %path.display(), keys = store.len(), "cached named properties file");
        files.insert(name.to_string(), Arc::clone(&store));
        Ok(store)
    }

    /// Number of files currently cached.
    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    /// Returns `true` if nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }
}
