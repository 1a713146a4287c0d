//! Organizer service: moves files from the watch root into category folders.
//!
//! The organizer knows nothing about the watch mechanism. Callers hand it a
//! path, it classifies the file, picks a free destination under
//! `<watch root>/<category>/`, and renames the file there.

use std::ffi::OsStr;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::classifier::Classifier;

/// Errors that can occur while organizing a single file
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("failed to create folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to inspect {path}: {source}")]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("path has no file name: {0}")]
    NoFileName(PathBuf),
}

/// Why a path was left where it is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Gone before we got to it
    Missing,
    Directory,
    Hidden,
}

/// Result of organizing one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizeOutcome {
    Moved {
        file_name: String,
        category: String,
        destination: PathBuf,
    },
    Skipped(SkipReason),
}

impl OrganizeOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, OrganizeOutcome::Moved { .. })
    }
}

/// Result of the startup sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Regular, non-hidden files present when the sweep started
    pub found: usize,
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Shutdown arrived before every found file was handled
    pub interrupted: bool,
}

/// Moves files into category folders under a fixed watch root
pub struct Organizer {
    watch_root: PathBuf,
    classifier: Classifier,
}

impl Organizer {
    pub fn new(watch_root: impl Into<PathBuf>, classifier: Classifier) -> Self {
        Self {
            watch_root: watch_root.into(),
            classifier,
        }
    }

    pub fn watch_root(&self) -> &Path {
        &self.watch_root
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Move one file into its category folder.
    ///
    /// Missing paths, directories and hidden files are skipped without error.
    pub async fn organize_file(&self, path: &Path) -> Result<OrganizeOutcome, OrganizeError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(OrganizeOutcome::Skipped(SkipReason::Missing))
            }
            Err(e) => {
                return Err(OrganizeError::Inspect {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        if metadata.is_dir() {
            return Ok(OrganizeOutcome::Skipped(SkipReason::Directory));
        }

        let file_name = path
            .file_name()
            .ok_or_else(|| OrganizeError::NoFileName(path.to_path_buf()))?;

        if is_hidden(file_name) {
            return Ok(OrganizeOutcome::Skipped(SkipReason::Hidden));
        }

        let category = self.classifier.classify(path).await;

        let folder = self.watch_root.join(&category);
        ensure_folder(&folder).await?;

        let destination = resolve_destination(&folder, file_name)
            .await
            .map_err(|e| OrganizeError::Inspect {
                path: folder.clone(),
                source: e,
            })?;

        tokio::fs::rename(path, &destination)
            .await
            .map_err(|e| OrganizeError::Move {
                from: path.to_path_buf(),
                to: destination.clone(),
                source: e,
            })?;

        Ok(OrganizeOutcome::Moved {
            file_name: file_name.to_string_lossy().into_owned(),
            category,
            destination,
        })
    }

    /// Organize one file and report the result on the console.
    ///
    /// Failures are printed and logged, never returned, so a bad file cannot
    /// stop the caller's loop. Returns `None` when the file failed.
    pub async fn handle_file(&self, path: &Path) -> Option<OrganizeOutcome> {
        match self.organize_file(path).await {
            Ok(outcome) => {
                match &outcome {
                    OrganizeOutcome::Moved {
                        file_name,
                        category,
                        destination,
                    } => {
                        println!("✓ Organized: {} → {}/", file_name, category);
                        tracing::debug!("Moved {} to {}", path.display(), destination.display());
                    }
                    OrganizeOutcome::Skipped(reason) => {
                        tracing::debug!("Skipped {} ({:?})", path.display(), reason);
                    }
                }
                Some(outcome)
            }
            Err(e) => {
                println!("✗ Error organizing {}: {}", path.display(), e);
                tracing::error!("Error organizing {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Organize every regular, non-hidden file directly under the watch root.
    ///
    /// Enumeration order is whatever the filesystem yields. Category folders
    /// are directories and are left alone.
    pub async fn organize_existing_files(&self) -> io::Result<SweepReport> {
        self.organize_existing_files_until(std::future::pending()).await
    }

    /// Sweep like [`organize_existing_files`](Self::organize_existing_files),
    /// stopping early once `shutdown` resolves.
    ///
    /// `shutdown` is only checked between files; the file being handled
    /// always finishes first.
    pub async fn organize_existing_files_until<S>(&self, shutdown: S) -> io::Result<SweepReport>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        println!("🔍 Scanning existing files...");

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.watch_root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            let metadata = match tokio::fs::metadata(&path).await {
                Ok(m) => m,
                Err(_) => continue,
            };

            if metadata.is_file() && !is_hidden(&entry.file_name()) {
                files.push(path);
            }
        }

        let mut report = SweepReport {
            found: files.len(),
            ..Default::default()
        };

        for path in &files {
            let stop = tokio::select! {
                biased;
                _ = &mut shutdown => true,
                _ = std::future::ready(()) => false,
            };
            if stop {
                tracing::info!("Shutdown requested, stopping sweep");
                report.interrupted = true;
                break;
            }

            match self.handle_file(path).await {
                Some(outcome) if outcome.is_moved() => report.moved += 1,
                Some(_) => report.skipped += 1,
                None => report.failed += 1,
            }
        }

        println!("✓ Organized {} existing files", report.found);
        tracing::info!(
            "Sweep of {}: {} found, {} moved, {} skipped, {} failed{}",
            self.watch_root.display(),
            report.found,
            report.moved,
            report.skipped,
            report.failed,
            if report.interrupted { " (interrupted)" } else { "" }
        );

        Ok(report)
    }
}

/// Leading-dot names are hidden
pub fn is_hidden(file_name: &OsStr) -> bool {
    file_name.to_string_lossy().starts_with('.')
}

/// Create a category folder, tolerating one that already exists
async fn ensure_folder(folder: &Path) -> Result<(), OrganizeError> {
    let source = match tokio::fs::create_dir(folder).await {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    if source.kind() == io::ErrorKind::AlreadyExists {
        if let Ok(metadata) = tokio::fs::metadata(folder).await {
            if metadata.is_dir() {
                return Ok(());
            }
        }
    }

    Err(OrganizeError::CreateFolder {
        path: folder.to_path_buf(),
        source,
    })
}

/// First free path for `file_name` inside `folder`.
///
/// Tries `folder/name.ext`, then `name_1.ext`, `name_2.ext`, ... The suffix
/// goes before the last extension only (`a.tar.gz` becomes `a.tar_1.gz`).
pub async fn resolve_destination(folder: &Path, file_name: &OsStr) -> io::Result<PathBuf> {
    let candidate = folder.join(file_name);
    if !tokio::fs::try_exists(&candidate).await? {
        return Ok(candidate);
    }

    let as_path = Path::new(file_name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter: u64 = 1;
    loop {
        let candidate = folder.join(format!("{}_{}{}", stem, counter, ext));
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
        counter += 1;
    }
}
