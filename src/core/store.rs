//! The merged file-backed property map.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Merged `key -> value` mapping built from all property sources.
///
/// Keys are case-sensitive and unordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyStore {
    values: HashMap<String, String>,
}

impl PropertyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look up a key, treating an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Returns `true` if the key is present (even with an empty value).
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Insert or overwrite a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Merge `other` into this store; `other` wins on conflicts.
    pub fn extend(&mut self, other: HashMap<String, String>) {
        self.values.extend(other);
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the store has no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<HashMap<String, String>> for PropertyStore {
    fn from(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_is_not_non_empty() {
        let store: PropertyStore = [("a", ""), ("b", "x")].into_iter().collect();
        assert!(store.contains_key("a"));
        assert_eq!(store.get("a"), Some(""));
        assert_eq!(store.get_non_empty("a"), None);
        assert_eq!(store.get_non_empty("b"), Some("x"));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let store: PropertyStore = [("Browser", "Chrome")].into_iter().collect();
        assert_eq!(store.get("browser"), None);
    }
}
