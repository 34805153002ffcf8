//! System properties and the resolved-value cache.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// Two-tier override state consulted before any file lookup.
///
/// The system tier holds externally supplied values and anything set at
/// runtime. The resolved tier caches environment-qualified results; the first
/// value cached for a key wins until [`clear_resolved`](Self::clear_resolved).
/// Failed resolutions are never cached.
#[derive(Debug, Default)]
pub struct OverrideLayer {
    system: RwLock<HashMap<String, String>>,
    resolved: RwLock<HashMap<String, String>>,
}

impl OverrideLayer {
    /// Create an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key in the system tier, then the resolved tier.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_system(key)
            .or_else(|| self.resolved.read().get(key).cloned())
    }

    /// Look up a key in the system tier only.
    pub fn get_system(&self, key: &str) -> Option<String> {
        self.system.read().get(key).cloned()
    }

    /// Returns `true` if the system tier holds `key`.
    pub fn contains_system(&self, key: &str) -> bool {
        self.system.read().contains_key(key)
    }

    /// Set a system property, replacing any previous value.
    pub fn set_system(&self, key: impl Into<String>, value: impl Into<String>) {
        self.system.write().insert(key.into(), value.into());
    }

    /// Set many system properties at once.
    pub fn extend_system(&self, values: impl IntoIterator<Item = (String, String)>) {
        self.system.write().extend(values);
    }

    /// Cache a resolved value and return whichever value is now cached.
    ///
    /// If another caller cached the key first, its value is kept.
    pub fn cache_resolved(&self, key: &str, value: String) -> String {
        self.resolved
            .write()
            .entry(key.to_string())
            .or_insert(value)
            .clone()
    }

    /// Drop every cached resolution. The system tier is kept.
    pub fn clear_resolved(&self) {
        self.resolved.write().clear();
    }

    /// Sorted copy of the system tier.
    pub fn system_snapshot(&self) -> BTreeMap<String, String> {
        self.system
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Sorted copy of the resolved tier.
    pub fn resolved_snapshot(&self) -> BTreeMap<String, String> {
        self.resolved
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_tier_shadows_resolved() {
        let layer = OverrideLayer::new();
        layer.cache_resolved("GOOGLEURL", "https://file".to_string());
        assert_eq!(layer.get("GOOGLEURL").as_deref(), Some("https://file"));

        layer.set_system("GOOGLEURL", "https://cli");
        assert_eq!(layer.get("GOOGLEURL").as_deref(), Some("https://cli"));
    }

    #[test]
    fn test_first_cached_value_wins() {
        let layer = OverrideLayer::new();
        assert_eq!(layer.cache_resolved("k", "one".to_string()), "one");
        assert_eq!(layer.cache_resolved("k", "two".to_string()), "one");
    }

    #[test]
    fn test_clear_resolved_keeps_system() {
        let layer = OverrideLayer::new();
        layer.set_system("Environment", "Stage");
        layer.cache_resolved("GOOGLEURL", "x".to_string());
        layer.clear_resolved();

        assert_eq!(layer.get("GOOGLEURL"), None);
        assert!(layer.contains_system("Environment"));
        assert!(layer.resolved_snapshot().is_empty());
        assert_eq!(layer.system_snapshot().len(), 1);
    }
}
