//! Property source trait.

use crate::error::Result;
use std::collections::HashMap;

/// Trait for property sources.
///
/// Implement this trait to feed the loader from somewhere other than a
/// directory of `.properties` files (a database table, a vault, a fixture).
pub trait PropertySource: Send + Sync {
    /// Load the source as a flat `key -> value` map.
    ///
    /// The returned map is merged with other sources according to priority.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or parsed.
    fn load(&self) -> Result<HashMap<String, String>>;

    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String;

    /// Get the priority of this source (higher = takes precedence).
    ///
    /// Default priorities:
    /// - Properties directory: 100
    /// - Custom sources: 100 unless overridden
    fn priority(&self) -> i32 {
        100
    }
}
