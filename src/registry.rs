//! Explicit id-to-constructor registry with cached instances.

use crate::error::{ConfigError, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type Constructor<T> = Box<dyn Fn() -> Arc<T> + Send + Sync>;

/// Maps an identifier to a constructor and hands out one shared instance per id.
///
/// Page objects and other per-scenario helpers are registered up front
/// instead of being discovered at runtime.
///
/// # Examples
///
/// ```rust
/// use harness_config::registry::ObjectRegistry;
/// use std::sync::Arc;
///
/// trait Page: Send + Sync {
///     fn title(&self) -> &str;
/// }
///
/// struct SearchPage;
/// impl Page for SearchPage {
///     fn title(&self) -> &str { "Google" }
/// }
///
/// let mut pages: ObjectRegistry<dyn Page> = ObjectRegistry::new();
/// pages.register("search", || Arc::new(SearchPage) as Arc<dyn Page>);
///
/// let page = pages.get("search").unwrap();
/// assert_eq!(page.title(), "Google");
/// assert!(Arc::ptr_eq(&page, &pages.get("search").unwrap()));
/// ```
pub struct ObjectRegistry<T: ?Sized> {
    constructors: HashMap<String, Constructor<T>>,
    instances: Mutex<HashMap<String, Arc<T>>>,
}

impl<T: ?Sized> ObjectRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Register a constructor for `id`, replacing any earlier one.
    ///
    /// An instance already built for `id` is dropped.
    pub fn register<F>(&mut self, id: impl Into<String>, constructor: F)
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let id = id.into();
        self.instances.get_mut().remove(&id);
        self.constructors.insert(id, Box::new(constructor));
    }

    /// The shared instance for `id`, constructed on first request.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownObject`] if nothing is registered for `id`.
    pub fn get(&self, id: &str) -> Result<Arc<T>> {
        let mut instances = self.instances.lock();
        if let Some(instance) = instances.get(id) {
            return Ok(Arc::clone(instance));
        }

        let constructor = self
            .constructors
            .get(id)
            .ok_or_else(|| ConfigError::UnknownObject(id.to_string()))?;
        let instance = constructor();
        tracing::debug!(id, "constructed registered object");
        instances.insert(id.to_string(), Arc::clone(&instance));
        Ok(instance)
    }

    /// Returns `true` if a constructor is registered for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.constructors.contains_key(id)
    }

    /// Drop every constructed instance; constructors stay registered.
    pub fn reset(&self) {
        self.instances.lock().clear();
    }
}

impl<T: ?Sized> Default for ObjectRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
