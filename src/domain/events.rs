//! File events delivered by the directory watch source.
//!
//! Events are ephemeral: they are handled once and dropped. Nothing is
//! persisted or replayed.

use std::path::PathBuf;

use notify::event::CreateKind;
use notify::EventKind;

/// What happened to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    Created,
    Modified,
}

/// A single filesystem notification for one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub kind: FileEventKind,
    pub path: PathBuf,
    pub is_dir: bool,
}

impl FileEvent {
    /// A creation event for a regular file
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: FileEventKind::Created,
            path: path.into(),
            is_dir: false,
        }
    }

    /// A modification event for a regular file
    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: FileEventKind::Modified,
            path: path.into(),
            is_dir: false,
        }
    }

    /// Mark the event as concerning a directory
    pub fn directory(mut self) -> Self {
        self.is_dir = true;
        self
    }

    /// Translate a raw notify event into zero or more file events.
    ///
    /// Only creations and modifications are kept. When notify does not say
    /// whether a created path is a folder, the filesystem is asked instead.
    pub fn from_notify(event: &notify::Event) -> Vec<Self> {
        let (kind, known_dir) = match event.kind {
            EventKind::Create(CreateKind::Folder) => (FileEventKind::Created, Some(true)),
            EventKind::Create(CreateKind::File) => (FileEventKind::Created, Some(false)),
            EventKind::Create(_) => (FileEventKind::Created, None),
            EventKind::Modify(_) => (FileEventKind::Modified, None),
            _ => return Vec::new(),
        };

        event
            .paths
            .iter()
            .map(|path| Self {
                kind,
                path: path.clone(),
                is_dir: known_dir.unwrap_or_else(|| path.is_dir()),
            })
            .collect()
    }
}
