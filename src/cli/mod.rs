//! Command-line interface for autosort.
//!
//! One optional positional argument: the folder to watch (defaults to the
//! current directory). The folder is created if it does not exist.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

pub mod watch;

/// autosort - Sort new files into category folders as they appear
#[derive(Parser, Debug)]
#[command(name = "autosort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder to watch and organize
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let watch_root = prepare_watch_root(&self.path)?;
        watch::run(watch_root).await
    }
}

/// Create the folder if needed and resolve it to an absolute path
pub fn prepare_watch_root(path: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create watch folder: {}", path.display()))?;

    let resolved = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve watch folder: {}", path.display()))?;

    if !resolved.is_dir() {
        anyhow::bail!("Not a directory: {}", resolved.display());
    }

    Ok(resolved)
}
