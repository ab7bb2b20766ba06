//! File watcher for watch mode.
//!
//! Changes to Rust sources below the input directory are debounced and
//! reported as [`WatchEvent`]s, so a burst of saves triggers one regeneration.

use crate::error::{CliResult, WatchError};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

/// Event types for file changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A file was created or modified.
    Modified(PathBuf),

    /// A file was deleted.
    Deleted(PathBuf),

    /// An error occurred.
    Error(String),
}

/// File watcher for monitoring Rust source files.
pub struct FileWatcher {
    root: PathBuf,
    debounce_ms: u64,
}

impl FileWatcher {
    /// Create a new file watcher for the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            debounce_ms: 500,
        }
    }

    /// Set the debounce duration in milliseconds.
    pub fn with_debounce(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Start watching for file changes.
    ///
    /// Events arrive on the returned receiver for as long as the debouncer
    /// is kept alive.
    pub fn watch(&self) -> CliResult<(Debouncer<RecommendedWatcher>, Receiver<WatchEvent>)> {
        let (tx, rx) = channel::<WatchEvent>();

        let mut debouncer = new_debouncer(
            Duration::from_millis(self.debounce_ms),
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    for event in events {
                        if let Some(watch_event) = WatchEvent::from_path(event.path) {
                            let _ = tx.send(watch_event);
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatchEvent::Error(e.to_string()));
                }
            },
        )
        .map_err(|e| WatchError::Init(e.to_string()))?;

        debouncer
            .watcher()
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::Notify(e.to_string()))?;

        tracing::debug!(root = %self.root.display(), debounce_ms = self.debounce_ms, "watching");
        Ok((debouncer, rx))
    }

    /// Get the root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl WatchEvent {
    /// Classify a changed path; anything but a `.rs` file is ignored.
    fn from_path(path: PathBuf) -> Option<Self> {
        if path.extension().map_or(true, |ext| ext != "rs") {
            return None;
        }

        Some(if path.exists() {
            WatchEvent::Modified(path)
        } else {
            WatchEvent::Deleted(path)
        })
    }

    /// Get the path associated with this event.
    pub fn path(&self) -> Option<&Path> {
        match self {
            WatchEvent::Modified(p) | WatchEvent::Deleted(p) => Some(p),
            WatchEvent::Error(_) => None,
        }
    }

    /// Get the error message if this is an error event.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            WatchEvent::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_event_from_path() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("lib.rs");
        std::fs::write(&existing, "").unwrap();

        assert_eq!(
            WatchEvent::from_path(existing.clone()),
            Some(WatchEvent::Modified(existing))
        );

        let removed = dir.path().join("gone.rs");
        assert_eq!(
            WatchEvent::from_path(removed.clone()),
            Some(WatchEvent::Deleted(removed))
        );

        assert_eq!(WatchEvent::from_path(dir.path().join("app.toml")), None);
    }

    #[test]
    fn test_watch_event_accessors() {
        let path = PathBuf::from("/test/file.rs");

        let modified = WatchEvent::Modified(path.clone());
        assert_eq!(modified.path(), Some(path.as_path()));
        assert_eq!(modified.error_message(), None);

        let error = WatchEvent::Error("test error".to_string());
        assert_eq!(error.path(), None);
        assert_eq!(error.error_message(), Some("test error"));
    }

    #[test]
    fn test_file_watcher_settings() {
        let watcher = FileWatcher::new("/test/path").with_debounce(1000);
        assert_eq!(watcher.root(), Path::new("/test/path"));
        assert_eq!(watcher.debounce_ms, 1000);
    }
}
