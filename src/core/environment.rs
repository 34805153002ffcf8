//! Environment-qualified property resolution.

use crate::core::PropertyStore;
use crate::error::{ConfigError, Result};
use std::collections::BTreeMap;

/// Store key that lists extra environments, comma-separated, in declared form.
pub const ENVIRONMENTS_KEY: &str = "Environments";

/// Environments known without any configuration.
pub const DEFAULT_ENVIRONMENTS: [&str; 5] = ["Stage", "Stage2", "Test", "Test2", "CloudStage"];

/// Maps environment names to the suffix used in qualified keys.
///
/// Lookup ignores case; the suffix keeps the declared form, so `cloudstage`
/// resolves `GOOGLEURL` through `GOOGLEURL_CloudStage`.
///
/// # Examples
///
/// ```rust
/// use harness_config::core::{EnvironmentRegistry, PropertyStore};
///
/// let store: PropertyStore = [("GOOGLEURL_CloudStage", "https://cloud")].into_iter().collect();
/// let registry = EnvironmentRegistry::default();
///
/// assert_eq!(registry.resolve(&store, "GOOGLEURL", "CLOUDSTAGE").unwrap(), "https://cloud");
/// assert!(registry.resolve(&store, "GOOGLEURL", "Prod").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentRegistry {
    suffixes: BTreeMap<String, String>,
}

impl Default for EnvironmentRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for name in DEFAULT_ENVIRONMENTS {
            registry.register(name);
        }
        registry
    }
}

impl EnvironmentRegistry {
    /// A registry with no environments.
    pub fn empty() -> Self {
        Self {
            suffixes: BTreeMap::new(),
        }
    }

    /// Register an environment by its declared suffix. Re-registering a name
    /// with different case replaces the suffix.
    pub fn register(&mut self, declared: &str) {
        let declared = declared.trim();
        if declared.is_empty() {
            return;
        }
        self.suffixes
            .insert(declared.to_uppercase(), declared.to_string());
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, declared: &str) -> Self {
        self.register(declared);
        self
    }

    /// Register every environment listed under [`ENVIRONMENTS_KEY`] in `store`.
    ///
    /// Returns how many names were read.
    pub fn register_from_store(&mut self, store: &PropertyStore) -> usize {
        let Some(list) = store.get(ENVIRONMENTS_KEY) else {
            return 0;
        };
        let mut count = 0;
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            self.register(name);
            count += 1;
        }
        tracing::debug!(count, "registered environments from properties");
        count
    }

    /// Returns `true` if the environment is registered (case-insensitive).
    pub fn contains(&self, environment: &str) -> bool {
        self.suffixes.contains_key(&environment.to_uppercase())
    }

    /// Declared suffixes of every registered environment.
    pub fn names(&self) -> Vec<String> {
        self.suffixes.values().cloned().collect()
    }

    /// The declared suffix for an environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedEnvironment`] if it is not registered.
    pub fn suffix(&self, environment: &str) -> Result<&str> {
        self.suffixes
            .get(&environment.to_uppercase())
            .map(String::as_str)
            .ok_or_else(|| ConfigError::UnsupportedEnvironment {
                environment: environment.to_string(),
            })
    }

    /// The `<key>_<Suffix>` key looked up for `environment`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedEnvironment`] if it is not registered.
    pub fn composite_key(&self, key: &str, environment: &str) -> Result<String> {
        Ok(format!("{}_{}", key, self.suffix(environment)?))
    }

    /// Resolve `key` for `environment` against `store`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnsupportedEnvironment`] for an unknown environment
    /// - [`ConfigError::UnresolvedKey`] if the qualified key is missing or empty
    pub fn resolve(&self, store: &PropertyStore, key: &str, environment: &str) -> Result<String> {
        let composite = self.composite_key(key, environment).inspect_err(|_| {
            tracing::error!(environment, "environment does not exist");
        })?;

        match store.get_non_empty(&composite) {
            Some(value) => Ok(value.to_string()),
            None => {
                tracing::error!(key = %composite, "qualified property missing");
                Err(ConfigError::UnresolvedKey {
                    key: composite,
                    hint: Some(
                        "Add the value for this environment to a properties file".to_string(),
                    ),
                })
            }
        }
    }
}
