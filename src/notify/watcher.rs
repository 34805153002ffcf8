//! File watching for automatic cache invalidation.

use crate::core::HarnessConfig;
use crate::error::{ConfigError, Result};
use crate::sources::has_properties_ext;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Watches one properties directory and signals when a `.properties` file
/// in it is created, modified or removed.
///
/// A burst of events produces a single signal once the directory has been
/// quiet for the debounce period. Dropping the watcher stops it.
///
/// # Examples
///
/// ```rust,no_run
/// use harness_config::notify::ConfigWatcher;
/// use std::time::Duration;
///
/// # async fn example() -> harness_config::error::Result<()> {
/// let (_watcher, mut rx) = ConfigWatcher::new(
///     "src/test/resources/ApplicationFiles/ConfigFiles",
///     Duration::from_millis(500),
/// )?;
///
/// while let Some(()) = rx.recv().await {
///     println!("properties changed");
/// }
/// # Ok(())
/// # }
/// ```
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    dir: PathBuf,
    debounce: Duration,
}

impl ConfigWatcher {
    /// Start watching `dir` (non-recursively).
    ///
    /// Returns the watcher and a receiver that gets `()` per settled burst of
    /// changes. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ConfigurationMissing`] if `dir` does not exist
    /// - [`ConfigError::WatchError`] if the platform watcher fails
    pub fn new(dir: impl AsRef<Path>, debounce: Duration) -> Result<(Self, mpsc::Receiver<()>)> {
        let dir = dir.as_ref();
        let dir = dir
            .canonicalize()
            .map_err(|e| ConfigError::missing(dir, format!("cannot watch ({e})")))?;

        let (changed_tx, changed_rx) = mpsc::unbounded_channel::<Vec<PathBuf>>();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let Ok(event) = res else { return };
            let relevant = matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            );
            if relevant && event.paths.iter().any(|p| has_properties_ext(p)) {
                let _ = changed_tx.send(event.paths);
            }
        })
        .map_err(|e| ConfigError::WatchError(format!("cannot create watcher: {e}")))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatchError(format!("cannot watch {}: {e}", dir.display())))?;

        let (signal_tx, signal_rx) = mpsc::channel(1);
        tokio::spawn(settle(changed_rx, signal_tx, debounce));

        tracing::debug!(dir = %dir.display(), ?debounce, "properties watcher started");
        Ok((
            Self {
                _watcher: watcher,
                dir,
                debounce,
            },
            signal_rx,
        ))
    }

    /// The canonical directory being watched.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// How long the directory must be quiet before a signal is sent.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }
}

/// Forward one signal per burst: wait for a change, then swallow further
/// changes until none arrives for `debounce`.
async fn settle(
    mut changed: mpsc::UnboundedReceiver<Vec<PathBuf>>,
    signal: mpsc::Sender<()>,
    debounce: Duration,
) {
    while let Some(paths) = changed.recv().await {
        tracing::debug!(?paths, "properties file changed");
        while let Ok(Some(paths)) = timeout(debounce, changed.recv()).await {
            tracing::trace!(?paths, "properties file changed again");
        }
        if signal.send(()).await.is_err() {
            break;
        }
    }
}

impl HarnessConfig {
    /// Watch the properties directory and invalidate caches after every
    /// settled burst of changes.
    ///
    /// Keep the returned watcher alive for as long as watching should last.
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle has no properties directory or it
    /// cannot be watched.
    pub fn watch(&self, debounce: Duration) -> Result<ConfigWatcher> {
        let dir = self
            .properties_dir()
            .ok_or_else(|| ConfigError::WatchError("No properties directory configured".to_string()))?;

        let (watcher, mut rx) = ConfigWatcher::new(dir, debounce)?;

        let config = self.clone();
        tokio::spawn(async move {
            while rx.recv().await.is_some() {
                config.invalidate();
            }
        });

        tracing::info!(dir = %watcher.dir().display(), "watching properties directory");
        Ok(watcher)
    }
}
