//! Per-scenario context.

use crate::core::HarnessConfig;
use crate::error::Result;
use crate::registry::ObjectRegistry;
use crate::substitution::RuntimeProperties;
use std::any::Any;

/// State handed to the steps of one scenario.
///
/// The configuration handle is shared with every other scenario; the runtime
/// properties and the object registry belong to this scenario alone, so
/// scenarios running on different threads cannot see each other's values.
///
/// # Examples
///
/// ```rust
/// use harness_config::prelude::*;
///
/// let store: PropertyStore = [("GOOGLEURL_Stage", "https://stage")].into_iter().collect();
/// let config = HarnessConfig::new(store);
/// config.set_system_property("Environment", "Stage");
///
/// let mut scenario = ScenarioContext::new(config);
/// scenario.runtime_mut().put("id", "42");
/// assert_eq!(scenario.substitute("delete from t where id = {$id}").unwrap(), "delete from t where id = 42");
/// assert_eq!(scenario.config().get_property("GOOGLEURL").unwrap(), "https://stage");
/// ```
pub struct ScenarioContext {
    config: HarnessConfig,
    runtime: RuntimeProperties,
    objects: ObjectRegistry<dyn Any + Send + Sync>,
}

impl ScenarioContext {
    /// Start a scenario with a clone of the shared configuration.
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            runtime: RuntimeProperties::new(),
            objects: ObjectRegistry::new(),
        }
    }

    /// The shared configuration.
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// This scenario's runtime properties.
    pub fn runtime(&self) -> &RuntimeProperties {
        &self.runtime
    }

    /// Mutable access to this scenario's runtime properties.
    pub fn runtime_mut(&mut self) -> &mut RuntimeProperties {
        &mut self.runtime
    }

    /// This scenario's object registry.
    pub fn objects(&self) -> &ObjectRegistry<dyn Any + Send + Sync> {
        &self.objects
    }

    /// Mutable access to the registry, for registering constructors.
    pub fn objects_mut(&mut self) -> &mut ObjectRegistry<dyn Any + Send + Sync> {
        &mut self.objects
    }

    /// Substitute `{$key}` placeholders from this scenario's runtime properties.
    ///
    /// # Errors
    ///
    /// See [`RuntimeProperties::substitute`].
    pub fn substitute(&self, template: &str) -> Result<String> {
        self.runtime.substitute(template)
    }
}
