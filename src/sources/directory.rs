//! Directory-based property source.

use super::{PropertySource, properties};
use crate::error::{ConfigError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File extension recognized as a properties file.
pub const PROPERTIES_EXT: &str = "properties";

/// Order in which files of a directory are merged.
///
/// The last merged file wins for duplicate keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MergeOrder {
    /// Whatever order the platform returns the directory entries in.
    ///
    /// This order is unspecified. Do not rely on it to settle conflicts.
    #[default]
    Listing,
    /// Sorted by file name.
    Lexical,
    /// Exactly these file names, merged in the given order.
    Explicit(Vec<String>),
}

/// Loads every `.properties` file directly under a directory into one map.
///
/// Subdirectories are not scanned.
///
/// # Examples
///
/// ```rust,no_run
/// use harness_config::sources::{DirectorySource, MergeOrder, PropertySource};
///
/// let source = DirectorySource::new("src/test/resources/ApplicationFiles/ConfigFiles")
///     .with_merge_order(MergeOrder::Lexical);
/// let map = source.load()?;
/// # Ok::<(), harness_config::error::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    order: MergeOrder,
    priority: i32,
}

impl DirectorySource {
    /// Create a source for the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            order: MergeOrder::Listing,
            priority: 100,
        }
    }

    /// Set the merge order for files in the directory.
    pub fn with_merge_order(mut self, order: MergeOrder) -> Self {
        self.order = order;
        self
    }

    /// Set the priority for this source.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// The directory this source reads.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List the files that will be merged, in merge order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigurationMissing`] if the directory cannot be
    /// listed, holds no properties files, or an explicitly named file is absent.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        if let MergeOrder::Explicit(names) = &self.order {
            return names
                .iter()
                .map(|name| {
                    let path = self.dir.join(name);
                    if path.is_file() {
                        Ok(path)
                    } else {
                        Err(ConfigError::missing(path, "properties file not found"))
                    }
                })
                .collect::<Result<Vec<_>>>()
                .and_then(|files| self.non_empty(files));
        }

        let entries = fs::read_dir(&self.dir).map_err(|e| {
            ConfigError::missing(
                &self.dir,
                format!(
                    "cannot list properties directory ({e}). Add all properties files under this folder"
                ),
            )
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && has_properties_ext(&path) {
                files.push(path);
            }
        }

        if self.order == MergeOrder::Lexical {
            files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        }

        self.non_empty(files)
    }

    fn non_empty(&self, files: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
        if files.is_empty() {
            return Err(ConfigError::missing(
                &self.dir,
                "no .properties files found",
            ));
        }
        Ok(files)
    }
}

pub(crate) fn has_properties_ext(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(PROPERTIES_EXT)
}

pub(crate) fn load_file(path: &Path) -> Result<HashMap<String, String>> {
    let bytes = fs::read(path).map_err(|e| {
        ConfigError::missing(path, format!("cannot read properties file ({e})"))
    })?;
    // Properties files are often Latin-1; fall back to a byte-per-char decode.
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    };
    properties::parse(&text).map_err(|e| match e {
        ConfigError::ParseError(msg) => {
            ConfigError::ParseError(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

impl PropertySource for DirectorySource {
    fn load(&self) -> Result<HashMap<String, String>> {
        let mut merged = HashMap::new();

        for path in self.files()? {
            let values = load_file(&path)?;
            tracing::debug!(file = %path.display(), keys = values.len(), "loaded properties file");
            for (key, value) in values {
                if let Some(previous) = merged.insert(key.clone(), value) {
                    tracing::trace!(%key, %previous, file = %path.display(), "property overwritten");
                }
            }
        }

        Ok(merged)
    }

    fn name(&self) -> String {
        format!("dir:{}", self.dir.display())
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}
