//! Builder for constructing HarnessConfig instances.

use crate::core::{EnvironmentRegistry, HarnessConfig, OverrideLayer, PropertyLoader};
use crate::error::{ConfigError, Result, ValidationError};
use crate::keys::WellKnownKey;
use crate::sources::{DirectorySource, MergeOrder, NamedFileCache, PropertySource, SystemSource};
use std::path::PathBuf;

/// Properties directory used when no source is configured, relative to the
/// working directory.
pub const DEFAULT_PROPERTIES_DIR: &str = "src/test/resources/ApplicationFiles/ConfigFiles";

/// Builder for constructing a [`HarnessConfig`].
///
/// # Examples
///
/// ```rust,no_run
/// use harness_config::prelude::*;
///
/// # fn example() -> Result<()> {
/// let config = HarnessConfig::builder()
///     .with_properties_dir("config")
///     .with_merge_order(MergeOrder::Lexical)
///     .with_system_env("HARNESS_")
///     .with_system_args(std::env::args())
///     .require(WellKnownKey::GoogleUrl)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct HarnessConfigBuilder {
    properties_dir: Option<PathBuf>,
    merge_order: MergeOrder,
    custom_sources: Vec<Box<dyn PropertySource>>,
    system_sources: Vec<Box<dyn PropertySource>>,
    environments: EnvironmentRegistry,
    required: Vec<String>,
}

impl HarnessConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            properties_dir: None,
            merge_order: MergeOrder::Listing,
            custom_sources: Vec::new(),
            system_sources: Vec::new(),
            environments: EnvironmentRegistry::default(),
            required: Vec::new(),
        }
    }

    /// Read every `.properties` file directly under `dir`.
    ///
    /// Defaults to [`DEFAULT_PROPERTIES_DIR`] when neither a directory nor a
    /// custom source is given.
    pub fn with_properties_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.properties_dir = Some(dir.into());
        self
    }

    /// Set the order files in the properties directory are merged in.
    pub fn with_merge_order(mut self, order: MergeOrder) -> Self {
        self.merge_order = order;
        self
    }

    /// Add a custom file-level source. Priority decides merge order against
    /// the properties directory (priority 100).
    pub fn with_source<S: PropertySource + 'static>(mut self, source: S) -> Self {
        self.custom_sources.push(Box::new(source));
        self
    }

    /// Take system properties from environment variables starting with `prefix`.
    ///
    /// ```rust,no_run
    /// use harness_config::prelude::*;
    ///
    /// // HARNESS_Environment=CloudStage -> Environment = CloudStage
    /// HarnessConfig::builder().with_system_env("HARNESS_");
    /// ```
    pub fn with_system_env(mut self, prefix: &str) -> Self {
        self.system_sources
            .push(Box::new(SystemSource::from_env(prefix).with_priority(300)));
        self
    }

    /// Take system properties from `-Dkey=value` arguments.
    pub fn with_system_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.system_sources
            .push(Box::new(SystemSource::from_args(args).with_priority(400)));
        self
    }

    /// Set a single system property. Explicit properties win over env and args.
    pub fn with_system_property(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        let pair = [(key.as_ref().to_string(), value.into())];
        self.system_sources
            .push(Box::new(SystemSource::from_pairs(pair).with_priority(500)));
        self
    }

    /// Register an environment beyond the defaults, by declared suffix.
    pub fn with_environment(mut self, declared: &str) -> Self {
        self.environments.register(declared);
        self
    }

    /// Replace the whole environment registry.
    pub fn with_environments(mut self, registry: EnvironmentRegistry) -> Self {
        self.environments = registry;
        self
    }

    /// Resolve `key` during [`build`](Self::build) and fail if it does not.
    pub fn require(mut self, key: impl AsRef<str>) -> Self {
        self.required.push(key.as_ref().to_string());
        self
    }

    /// Build the configuration handle.
    ///
    /// Loads the store, registers environments listed in it, then copies
    /// `Environment`, `tagToRun` and `Browser` from the store into system
    /// properties unless already set, and mirrors the environment into
    /// `Database`. Finally every required key is resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A source fails to load (including a missing properties directory)
    /// - A required key fails to resolve; all failures are reported together
    pub fn build(self) -> Result<HarnessConfig> {
        let mut loader = PropertyLoader::new();

        let dir = match (&self.properties_dir, self.custom_sources.is_empty()) {
            (Some(dir), _) => Some(dir.clone()),
            (None, true) => Some(PathBuf::from(DEFAULT_PROPERTIES_DIR)),
            (None, false) => None,
        };

        if let Some(dir) = &dir {
            loader.add_source(Box::new(
                DirectorySource::new(dir).with_merge_order(self.merge_order.clone()),
            ));
        }
        for source in self.custom_sources {
            loader.add_source(source);
        }

        let overrides = OverrideLayer::new();
        if !self.system_sources.is_empty() {
            let mut system_loader = PropertyLoader::new();
            for source in self.system_sources {
                system_loader.add_source(source);
            }
            let system = system_loader.load()?;
            overrides.extend_system(
                system
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string())),
            );
        }

        let config = HarnessConfig::with_loader(
            loader,
            self.environments,
            overrides,
            dir.map(NamedFileCache::new),
        );

        let store = config.store()?;
        seed_startup_defaults(&config, |key| store.get(key).map(str::to_string));

        check_required(&config, &self.required)?;

        let environment = config
            .system_property(WellKnownKey::Environment)
            .unwrap_or_else(|| "<unset>".to_string());
        let browser = config
            .system_property(WellKnownKey::Browser)
            .unwrap_or_else(|| "<unset>".to_string());
        tracing::info!(%environment, %browser, "harness configuration ready");
        Ok(config)
    }
}

fn seed_startup_defaults(config: &HarnessConfig, file_value: impl Fn(&str) -> Option<String>) {
    let overrides = config.overrides();
    for key in WellKnownKey::STARTUP_DEFAULTS {
        if overrides.contains_system(key.as_str()) {
            continue;
        }
        match file_value(key.as_str()) {
            Some(value) => overrides.set_system(key.as_str(), value),
            None => tracing::warn!(key = key.as_str(), "no default in properties files"),
        }
    }

    if let Some(environment) = overrides.get_system(WellKnownKey::Environment.as_str()) {
        overrides.set_system(WellKnownKey::Database.as_str(), environment);
    }
}

fn check_required(config: &HarnessConfig, required: &[String]) -> Result<()> {
    let mut failures: Vec<ValidationError> = required
        .iter()
        .filter_map(|key| {
            config
                .get_property(key)
                .err()
                .map(|e| ValidationError::invalid_field(key, e.to_string()))
        })
        .collect();

    match failures.len() {
        0 => Ok(()),
        1 => Err(ConfigError::from(failures.remove(0))),
        _ => Err(ConfigError::from(ValidationError::Multiple(failures))),
    }
}

impl Default for HarnessConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HarnessConfig {
    /// Create a new builder for constructing a configuration handle.
    pub fn builder() -> HarnessConfigBuilder {
        HarnessConfigBuilder::new()
    }
}
