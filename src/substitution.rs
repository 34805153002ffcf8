//! Runtime scratch properties and `{$key}` placeholder substitution.
//!
//! Steps store values while a scenario runs (a column read from a previous
//! query, an id returned by an API) and later steps splice them into SQL or
//! other text:
//!
//! ```rust
//! use harness_config::substitution::RuntimeProperties;
//!
//! let mut runtime = RuntimeProperties::new();
//! runtime.put("name", "Alice");
//! runtime.put("lastName", "Smith");
//!
//! let sql = runtime
//!     .substitute("select * from t where name = {$name} and lastName = {$lastName}")
//!     .unwrap();
//! assert_eq!(sql, "select * from t where name = Alice and lastName = Smith");
//! ```

use crate::error::{ConfigError, Result};
use std::collections::HashMap;

/// Opening marker of a placeholder.
pub const MARKER: &str = "{$";

/// Deepest chain of values referring to other values.
pub const MAX_DEPTH: usize = 128;

/// Largest string, in bytes, an expansion may produce.
pub const MAX_EXPANDED_LEN: usize = 8 * 1024 * 1024;

/// Upper bound on replacement steps in one call.
pub const MAX_REPLACEMENTS: usize = 65_536;

/// Scratch key/value space for one scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeProperties {
    values: HashMap<String, String>,
}

impl RuntimeProperties {
    /// Create an empty scratch space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any previous one.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        tracing::trace!(%key, %value, "runtime property stored");
        self.values.insert(key, value);
    }

    /// The stored value with no placeholder expansion.
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The stored value with its own placeholders expanded.
    ///
    /// # Errors
    ///
    /// Same as [`substitute`](Self::substitute), plus
    /// [`ConfigError::UnresolvedKey`] if `key` itself is absent.
    pub fn get(&self, key: &str) -> Result<String> {
        Expansion::new(&self.values).lookup(key)
    }

    /// Remove a value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Returns `true` if `key` is stored.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Drop every value.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every `{$key}` in `template` with the stored value for `key`.
    ///
    /// Placeholders are taken left to right: the first `{$`, up to the next
    /// `}`. All occurrences of that exact placeholder are replaced with the
    /// fully expanded value, then scanning starts again. Keys are
    /// case-sensitive. A template with no `{$` is returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnresolvedKey`] if a key is not stored
    /// - [`ConfigError::MalformedPlaceholder`] if a `{$` has no closing `}`
    /// - [`ConfigError::CyclicSubstitution`] if a value refers back to a key
    ///   being expanded
    /// - [`ConfigError::SubstitutionLimit`] past [`MAX_DEPTH`] nested values,
    ///   [`MAX_EXPANDED_LEN`] bytes of output or [`MAX_REPLACEMENTS`] steps
    pub fn substitute(&self, template: &str) -> Result<String> {
        Expansion::new(&self.values).expand(template)
    }
}

/// State for one expansion: the keys being expanded and the values already
/// expanded, so each key is expanded at most once per call.
struct Expansion<'a> {
    values: &'a HashMap<String, String>,
    chain: Vec<String>,
    expanded: HashMap<String, String>,
    replacements: usize,
}

impl<'a> Expansion<'a> {
    fn new(values: &'a HashMap<String, String>) -> Self {
        Self {
            values,
            chain: Vec::new(),
            expanded: HashMap::new(),
            replacements: 0,
        }
    }

    fn expand(&mut self, input: &str) -> Result<String> {
        let mut current = input.to_string();

        loop {
            let Some(start) = current.find(MARKER) else {
                return Ok(current);
            };
            let key_start = start + MARKER.len();
            let Some(len) = current[key_start..].find('}') else {
                return Err(ConfigError::MalformedPlaceholder {
                    position: start,
                    input: current,
                });
            };
            let key = current[key_start..key_start + len].to_string();

            self.replacements += 1;
            if self.replacements > MAX_REPLACEMENTS {
                return Err(limit(key, "replacement", MAX_REPLACEMENTS));
            }

            let value = self.lookup(&key)?;
            let placeholder = format!("{{${}}}", key);
            let occurrences = current.matches(placeholder.as_str()).count();
            let new_len = (current.len() - occurrences * placeholder.len())
                .saturating_add(occurrences.saturating_mul(value.len()));
            if new_len > MAX_EXPANDED_LEN {
                return Err(limit(key, "length", MAX_EXPANDED_LEN));
            }

            current = current.replace(&placeholder, &value);
            tracing::debug!(%key, %value, "Key replaced with value");
        }
    }

    fn lookup(&mut self, key: &str) -> Result<String> {
        if let Some(value) = self.expanded.get(key) {
            return Ok(value.clone());
        }
        if self.chain.iter().any(|k| k == key) {
            let mut cycle = self.chain.clone();
            cycle.push(key.to_string());
            return Err(ConfigError::CyclicSubstitution { chain: cycle });
        }
        if self.chain.len() >= MAX_DEPTH {
            return Err(limit(key.to_string(), "depth", MAX_DEPTH));
        }

        let values = self.values;
        let raw = values.get(key).ok_or_else(|| {
            tracing::error!(key, "runtime property not found");
            ConfigError::unresolved(key)
        })?;

        self.chain.push(key.to_string());
        let expanded = self.expand(raw);
        self.chain.pop();

        let expanded = expanded?;
        self.expanded.insert(key.to_string(), expanded.clone());
        Ok(expanded)
    }
}

fn limit(key: String, kind: &'static str, max: usize) -> ConfigError {
    tracing::error!(%key, kind, max, "substitution limit reached");
    ConfigError::SubstitutionLimit { key, kind, max }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RuntimeProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for RuntimeProperties {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> RuntimeProperties {
        [("name", "Alice"), ("lastName", "Smith")].into_iter().collect()
    }

    #[test]
    fn test_two_placeholders() {
        let out = runtime()
            .substitute("select * from t where name = {$name} and lastName = {$lastName}")
            .unwrap();
        assert_eq!(out, "select * from t where name = Alice and lastName = Smith");
    }

    #[test]
    fn test_no_marker_unchanged() {
        let runtime = RuntimeProperties::new();
        assert_eq!(runtime.substitute("").unwrap(), "");
        assert_eq!(runtime.substitute("select 1 where a = {b} and $c").unwrap(), "select 1 where a = {b} and $c");
    }

    #[test]
    fn test_missing_key() {
        let err = RuntimeProperties::new()
            .substitute("select * from t where id = {$missing}")
            .unwrap_err();
        match err {
            ConfigError::UnresolvedKey { key, .. } => assert_eq!(key, "missing"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        assert!(runtime().substitute("{$Name}").is_err());
    }

    #[test]
    fn test_repeated_placeholder_replaced_everywhere() {
        let out = runtime().substitute("{$name}, {$name}!").unwrap();
        assert_eq!(out, "Alice, Alice!");
    }

    #[test]
    fn test_nested_values_expand() {
        let mut runtime = runtime();
        runtime.put("fullName", "{$name} {$lastName}");
        assert_eq!(runtime.get("fullName").unwrap(), "Alice Smith");
        assert_eq!(runtime.get_raw("fullName"), Some("{$name} {$lastName}"));
        assert_eq!(runtime.substitute("hi {$fullName}").unwrap(), "hi Alice Smith");
    }

    #[test]
    fn test_self_reference_is_cyclic() {
        let mut runtime = RuntimeProperties::new();
        runtime.put("a", "x{$a}");
        match runtime.substitute("{$a}").unwrap_err() {
            ConfigError::CyclicSubstitution { chain } => assert_eq!(chain, vec!["a", "a"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_indirect_cycle() {
        let mut runtime = RuntimeProperties::new();
        runtime.put("a", "{$b}");
        runtime.put("b", "{$c}");
        runtime.put("c", "{$a}");
        match runtime.get("a").unwrap_err() {
            ConfigError::CyclicSubstitution { chain } => {
                assert_eq!(chain, vec!["a", "b", "c", "a"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_key_twice_is_not_a_cycle() {
        let mut runtime = runtime();
        runtime.put("pair", "{$name}/{$name}");
        runtime.put("both", "{$pair}-{$name}");
        assert_eq!(runtime.get("both").unwrap(), "Alice/Alice-Alice");
    }

    #[test]
    fn test_unterminated_placeholder() {
        match runtime().substitute("a = {$name} and b = {$open").unwrap_err() {
            ConfigError::MalformedPlaceholder { position, input } => {
                assert_eq!(input, "a = Alice and b = {$open");
                assert_eq!(position, 18);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_closing_brace_ends_key() {
        let mut runtime = RuntimeProperties::new();
        runtime.put("a", "1");
        assert_eq!(runtime.substitute("{$a}}").unwrap(), "1}");
    }

    #[test]
    fn test_rebuilt_placeholder_is_expanded() {
        // Replacing {$a} with "{" forms the next placeholder from what follows.
        let mut runtime = RuntimeProperties::new();
        runtime.put("a", "{");
        let template = format!("{{$a}}{}", "$a}".repeat(3));
        assert_eq!(runtime.substitute(&template).unwrap(), "{");
    }

    fn chain(depth: usize) -> RuntimeProperties {
        let mut runtime: RuntimeProperties = (0..depth)
            .map(|i| (format!("k{}", i), format!("{{$k{}}}", i + 1)))
            .collect();
        runtime.put(format!("k{}", depth), "leaf");
        runtime
    }

    #[test]
    fn test_nesting_within_depth_limit() {
        assert_eq!(chain(MAX_DEPTH - 1).substitute("{$k0}").unwrap(), "leaf");
    }

    #[test]
    fn test_nesting_past_depth_limit_is_an_error() {
        for depth in [MAX_DEPTH + 1, 5000] {
            match chain(depth).substitute("{$k0}").unwrap_err() {
                ConfigError::SubstitutionLimit { kind, max, .. } => {
                    assert_eq!(kind, "depth");
                    assert_eq!(max, MAX_DEPTH);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn test_many_distinct_placeholders() {
        let runtime: RuntimeProperties = (0..1100).map(|i| (format!("id{}", i), i.to_string())).collect();
        let template = (0..1100)
            .map(|i| format!("({{$id{}}})", i))
            .collect::<Vec<_>>()
            .join(",");
        let expected = (0..1100).map(|i| format!("({})", i)).collect::<Vec<_>>().join(",");
        assert_eq!(runtime.substitute(&template).unwrap(), expected);
    }

    #[test]
    fn test_doubling_values_hit_length_limit() {
        let depth = 40;
        let mut runtime: RuntimeProperties = (0..depth)
            .map(|i| (format!("k{}", i), format!("{{$k{n}}}{{$k{n}}}", n = i + 1)))
            .collect();
        runtime.put(format!("k{}", depth), "x");

        // 2^10 bytes is well under the cap.
        assert_eq!(runtime.get("k30").unwrap().len(), 1024);

        match runtime.substitute("{$k0}").unwrap_err() {
            ConfigError::SubstitutionLimit { kind, max, .. } => {
                assert_eq!(kind, "length");
                assert_eq!(max, MAX_EXPANDED_LEN);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_put_remove_clear() {
        let mut runtime = runtime();
        assert_eq!(runtime.len(), 2);
        runtime.put("name", "Bob");
        assert_eq!(runtime.get("name").unwrap(), "Bob");
        assert_eq!(runtime.remove("name").as_deref(), Some("Bob"));
        assert!(!runtime.contains_key("name"));
        runtime.extend([("x", "1")]);
        runtime.clear();
        assert!(runtime.is_empty());
    }
}
