//! Directory watch source.
//!
//! Watches a single directory (non-recursive) and forwards creation and
//! modification notifications as [`FileEvent`]s over a bounded channel.
//! Events queue up in the channel while the consumer is busy with a file.

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::FileEvent;

/// Capacity of the event channel
const EVENT_BUFFER: usize = 256;

/// Errors that can occur with the watcher
#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("Watch directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

/// Watches one directory for file events
pub struct DirectoryWatcher {
    root: PathBuf,
}

impl DirectoryWatcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start watching. Events arrive on the returned receiver until the
    /// handle is stopped or dropped.
    pub fn subscribe(&self) -> Result<(mpsc::Receiver<FileEvent>, WatchHandle), WatcherError> {
        if !self.root.is_dir() {
            return Err(WatcherError::DirectoryNotFound(self.root.clone()));
        }

        let (event_tx, event_rx) = mpsc::channel::<FileEvent>(EVENT_BUFFER);

        // Runs on notify's own thread, so blocking_send is safe here
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    for file_event in FileEvent::from_notify(&event) {
                        if event_tx.blocking_send(file_event).is_err() {
                            // Receiver gone, nothing left to deliver to
                            return;
                        }
                    }
                }
                Err(e) => tracing::warn!("Watcher error: {:?}", e),
            }
        })?;

        watcher.watch(&self.root, RecursiveMode::NonRecursive)?;

        tracing::info!("Watching {} for new files", self.root.display());

        Ok((
            event_rx,
            WatchHandle {
                root: self.root.clone(),
                watcher,
            },
        ))
    }
}

/// Handle to control the watcher
pub struct WatchHandle {
    root: PathBuf,
    watcher: RecommendedWatcher,
}

impl WatchHandle {
    /// Stop the watcher. The event channel closes once the watcher is gone.
    pub fn stop(mut self) {
        if let Err(e) = self.watcher.unwatch(&self.root) {
            tracing::debug!("Unwatch {} failed: {}", self.root.display(), e);
        }
        tracing::info!("Watcher stopped");
    }
}
