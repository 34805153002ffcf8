//! Core property resolution types.

mod builder;
mod config_handle;
mod environment;
mod loader;
mod overrides;
mod store;

pub use builder::{DEFAULT_PROPERTIES_DIR, HarnessConfigBuilder};
pub use config_handle::{ConfigSnapshot, HarnessConfig};
pub use environment::{DEFAULT_ENVIRONMENTS, ENVIRONMENTS_KEY, EnvironmentRegistry};
pub use loader::PropertyLoader;
pub use overrides::OverrideLayer;
pub use store::PropertyStore;
