//! # harness-config
//!
//! Property resolution and runtime placeholder substitution for UI test harnesses.
//!
//! ## Overview
//!
//! A harness needs to know, per run, which URLs, credentials and switches
//! apply. `harness-config` answers that with a layered lookup:
//!
//! 1. **System properties**: `-Dkey=value` arguments, prefixed environment
//!    variables, or values set at runtime
//! 2. **Resolved cache**: values already resolved on this handle
//! 3. **Environment-qualified file lookup**: `<key>_<Environment>` in the
//!    merged `.properties` files, e.g. `GOOGLEURL_CloudStage`
//!
//! Steps that capture values while a scenario runs store them in
//! [`RuntimeProperties`](substitution::RuntimeProperties) and splice them into
//! SQL or other text through `{$key}` placeholders.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use harness_config::prelude::*;
//!
//! # fn example() -> Result<()> {
//! // Config.properties:
//! //   Environment=CloudStage
//! //   Browser=ChromeOnLocal
//! //   GOOGLEURL_CloudStage=https://cloud.example.com
//! let config = HarnessConfig::builder()
//!     .with_properties_dir("src/test/resources/ApplicationFiles/ConfigFiles")
//!     .with_system_args(std::env::args())
//!     .require(WellKnownKey::GoogleUrl)
//!     .build()?;
//!
//! let url = config.get_property(WellKnownKey::GoogleUrl)?;
//!
//! let mut scenario = ScenarioContext::new(config.clone());
//! scenario.runtime_mut().put("id", "42");
//! let sql = scenario.substitute("select * from orders where id = {$id}")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `file-watch`: watch the properties directory and invalidate caches on change
//! - `json`: render [`ConfigSnapshot`](core::ConfigSnapshot) as JSON

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod keys;
pub mod registry;
pub mod scenario;
pub mod sources;
pub mod substitution;

#[cfg(feature = "file-watch")]
pub mod notify;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{
        EnvironmentRegistry, HarnessConfig, HarnessConfigBuilder, PropertyStore,
    };
    pub use crate::error::{ConfigError, Result, ValidationError};
    pub use crate::keys::WellKnownKey;
    pub use crate::scenario::ScenarioContext;
    pub use crate::sources::{MergeOrder, PropertySource};
    pub use crate::substitution::RuntimeProperties;
}
