//! The shared configuration handle.

use crate::core::{EnvironmentRegistry, OverrideLayer, PropertyLoader, PropertyStore};
use crate::error::{ConfigError, Result};
use crate::keys::WellKnownKey;
use crate::sources::NamedFileCache;
use arc_swap::ArcSwapOption;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Resolves properties through system overrides, a resolved-value cache and
/// environment-qualified file lookups.
///
/// Cloning is cheap and every clone shares the same store and caches, so one
/// handle can be created at startup and passed into each scenario.
///
/// # Examples
///
/// ```rust,no_run
/// use harness_config::prelude::*;
///
/// # fn example() -> Result<()> {
/// let config = HarnessConfig::builder()
///     .with_properties_dir("src/test/resources/ApplicationFiles/ConfigFiles")
///     .with_system_args(std::env::args())
///     .build()?;
///
/// // GOOGLEURL_<Environment> from the properties files, cached after the first read
/// let url = config.get_property(WellKnownKey::GoogleUrl)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HarnessConfig {
    /// Merged file-backed store; `None` until loaded or after invalidation
    store: Arc<ArcSwapOption<PropertyStore>>,
    /// Loader used for lazy loads and reloads
    loader: Option<Arc<PropertyLoader>>,
    /// Environment name to key suffix mapping
    environments: Arc<RwLock<EnvironmentRegistry>>,
    /// System properties and resolved cache
    overrides: Arc<OverrideLayer>,
    /// Individually requested files from the properties directory
    named_files: Option<Arc<NamedFileCache>>,
}

/// Serializable view of what a [`HarnessConfig`] currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot {
    /// Active environment, if one is set
    pub environment: Option<String>,
    /// Registered environment suffixes
    pub environments: Vec<String>,
    /// System properties
    pub system: BTreeMap<String, String>,
    /// Cached environment-qualified resolutions
    pub resolved: BTreeMap<String, String>,
}

#[cfg(feature = "json")]
impl ConfigSnapshot {
    /// Render the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Other(format!("Failed to serialize snapshot: {}", e)))
    }
}

impl HarnessConfig {
    /// Create a handle over an already-built store.
    ///
    /// There is no loader, so [`invalidate`](Self::invalidate) only clears the
    /// resolved cache. For most use cases prefer [`HarnessConfig::builder`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use harness_config::prelude::*;
    ///
    /// let store: PropertyStore = [("GOOGLEURL_Test", "https://test")].into_iter().collect();
    /// let config = HarnessConfig::new(store);
    /// config.set_system_property("Environment", "Test");
    /// assert_eq!(config.get_property("GOOGLEURL").unwrap(), "https://test");
    /// ```
    pub fn new(store: PropertyStore) -> Self {
        Self {
            store: Arc::new(ArcSwapOption::from_pointee(store)),
            loader: None,
            environments: Arc::new(RwLock::new(EnvironmentRegistry::default())),
            overrides: Arc::new(OverrideLayer::new()),
            named_files: None,
        }
    }

    pub(crate) fn with_loader(
        loader: PropertyLoader,
        environments: EnvironmentRegistry,
        overrides: OverrideLayer,
        named_files: Option<NamedFileCache>,
    ) -> Self {
        Self {
            store: Arc::new(ArcSwapOption::empty()),
            loader: Some(Arc::new(loader)),
            environments: Arc::new(RwLock::new(environments)),
            overrides: Arc::new(overrides),
            named_files: named_files.map(Arc::new),
        }
    }

    /// Get a property, resolving it for the active environment on first use.
    ///
    /// Order: system properties, then previously resolved values, then
    /// `<key>_<Environment>` in the file store. A successful resolution is
    /// cached for the life of the handle (or until [`invalidate`](Self::invalidate)).
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnresolvedKey`] if no environment is set or the
    ///   qualified key is missing or empty
    /// - [`ConfigError::UnsupportedEnvironment`] if the environment is unknown
    /// - any load error if the store has to be (re)loaded
    pub fn get_property(&self, key: impl AsRef<str>) -> Result<String> {
        let key = key.as_ref();
        if let Some(value) = self.overrides.get(key) {
            tracing::debug!(key, %value, "Value for property (cached)");
            return Ok(value);
        }

        let store = self.store()?;
        let environment = self.active_environment()?;
        let value = self
            .environments
            .read()
            .resolve(&store, key, &environment)?;
        let value = self.overrides.cache_resolved(key, value);

        tracing::debug!(key, %environment, %value, "Value for property");
        Ok(value)
    }

    /// Get an unqualified value straight from the file store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnresolvedKey`] if the key is absent.
    pub fn get_as_string(&self, key: impl AsRef<str>) -> Result<String> {
        let key = key.as_ref();
        self.store()?
            .get(key)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::UnresolvedKey {
                key: key.to_string(),
                hint: Some("Add it to a properties file".to_string()),
            })
    }

    /// Get an unqualified value as a boolean.
    ///
    /// Only `true` (any case) is true; a missing key is `false`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store cannot be loaded.
    pub fn get_as_boolean(&self, key: impl AsRef<str>) -> Result<bool> {
        Ok(self
            .store()?
            .get(key.as_ref())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")))
    }

    /// Get an unqualified value and base64-decode it.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnresolvedKey`] if the key is absent
    /// - [`ConfigError::DecodeError`] if the value is not base64 of UTF-8 text
    pub fn get_decoded(&self, key: impl AsRef<str>) -> Result<String> {
        let key = key.as_ref();
        let encoded = self.get_as_string(key)?;
        let decode_err = |reason: String| ConfigError::DecodeError {
            key: key.to_string(),
            reason,
        };
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| decode_err(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| decode_err(e.to_string()))
    }

    /// Get a file from the properties directory by logical name, e.g. `DBConfig`.
    ///
    /// Each name is read once and shared afterwards.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ConfigurationMissing`] if the file is absent
    /// - [`ConfigError::Other`] if the handle was not built with a properties
    ///   directory
    pub fn named_file(&self, name: &str) -> Result<Arc<PropertyStore>> {
        let cache = self.named_files.as_ref().ok_or_else(|| {
            ConfigError::Other("No properties directory configured".to_string())
        })?;
        cache.get(name)
    }

    /// The properties directory, if the handle was built with one.
    pub fn properties_dir(&self) -> Option<&Path> {
        self.named_files.as_deref().map(NamedFileCache::dir)
    }

    /// The active environment (the `Environment` system property).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnresolvedKey`] if none is set.
    pub fn active_environment(&self) -> Result<String> {
        let key = WellKnownKey::Environment.as_str();
        self.overrides
            .get_system(key)
            .ok_or_else(|| ConfigError::UnresolvedKey {
                key: key.to_string(),
                hint: Some(
                    "Pass -DEnvironment=<name> or set Environment in a properties file".to_string(),
                ),
            })
    }

    /// Read a system property without triggering resolution.
    pub fn system_property(&self, key: impl AsRef<str>) -> Option<String> {
        self.overrides.get_system(key.as_ref())
    }

    /// Set a system property. It shadows every file-backed and cached value.
    pub fn set_system_property(&self, key: impl AsRef<str>, value: impl Into<String>) {
        let key = key.as_ref();
        let value = value.into();
        tracing::debug!(key, %value, "system property set");
        self.overrides.set_system(key, value);
    }

    /// Drop the loaded store and every cached resolution.
    ///
    /// System properties are kept. The next read reloads from the sources.
    /// Without a loader the store itself is kept.
    pub fn invalidate(&self) {
        if self.loader.is_some() {
            self.store.store(None);
        }
        self.overrides.clear_resolved();
        tracing::info!("configuration caches invalidated");
    }

    /// Reload the store from every source now and clear cached resolutions.
    ///
    /// On failure the previous store stays in place.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no loader or any source fails.
    pub fn reload(&self) -> Result<()> {
        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| ConfigError::Other("No loader available for reload".to_string()))?;

        let store = Arc::new(loader.load()?);
        self.environments.write().register_from_store(&store);
        self.store.store(Some(store));
        self.overrides.clear_resolved();
        tracing::info!("configuration reloaded");
        Ok(())
    }

    /// Returns `true` if the file store is currently loaded.
    pub fn is_loaded(&self) -> bool {
        self.store.load().is_some()
    }

    /// Current store, loading it first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store must be loaded and loading fails.
    pub fn store(&self) -> Result<Arc<PropertyStore>> {
        if let Some(store) = self.store.load_full() {
            return Ok(store);
        }

        let loader = self
            .loader
            .as_ref()
            .ok_or_else(|| ConfigError::Other("No loader available".to_string()))?;

        // Concurrent first loads race benignly; the last one stored is kept.
        let store = Arc::new(loader.load()?);
        self.environments.write().register_from_store(&store);
        self.store.store(Some(Arc::clone(&store)));
        tracing::info!(keys = store.len(), sources = ?loader.source_names(), "property store loaded");
        Ok(store)
    }

    /// Register an additional environment at runtime.
    pub fn register_environment(&self, declared: &str) {
        self.environments.write().register(declared);
    }

    /// Capture the current environment, system properties and cache.
    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            environment: self.system_property(WellKnownKey::Environment),
            environments: self.environments.read().names(),
            system: self.overrides.system_snapshot(),
            resolved: self.overrides.resolved_snapshot(),
        }
    }

    pub(crate) fn overrides(&self) -> &OverrideLayer {
        &self.overrides
    }
}

impl Clone for HarnessConfig {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            loader: self.loader.clone(),
            environments: Arc::clone(&self.environments),
            overrides: Arc::clone(&self.overrides),
            named_files: self.named_files.clone(),
        }
    }
}
