//! Property source implementations.

mod directory;
mod named;
mod property_source;
pub mod properties;
mod system;

#[cfg(feature = "file-watch")]
pub(crate) use directory::has_properties_ext;
pub use directory::{DirectorySource, MergeOrder, PROPERTIES_EXT};
pub use named::NamedFileCache;
pub use property_source::PropertySource;
pub use system::SystemSource;
