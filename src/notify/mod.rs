//! Properties directory watching.
//!
//! Invalidates a [`HarnessConfig`](crate::core::HarnessConfig) whenever a
//! `.properties` file changes, so the next read reloads.

pub mod watcher;

pub use watcher::ConfigWatcher;
