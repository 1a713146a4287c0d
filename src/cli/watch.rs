//! The watch session: banner, startup sweep, watch loop, Ctrl+C shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;

use crate::config::ResolvedConfig;
use crate::core::{Classifier, Organizer};
use crate::ingest::{DirectoryWatcher, EventHandler};

/// Run until interrupted
pub async fn run(watch_root: PathBuf) -> Result<()> {
    let config = ResolvedConfig::load()?;

    if let Some(path) = &config.config_file {
        tracing::info!("Using config file {}", path.display());
    }
    if !config.has_api_key() {
        tracing::warn!(
            "GEMINI_API_KEY is not set; files with unknown extensions will go to Other"
        );
    }

    let organizer = Arc::new(build_organizer(&config, watch_root.clone()));

    // Ctrl+C is listened for from here on, so an interrupt during the sweep
    // also takes the orderly path
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    });
    tokio::task::yield_now().await;

    println!("{}", "=".repeat(60));
    println!("🤖 Smart File Organizer with Gemini AI");
    println!("{}", "=".repeat(60));
    println!("📁 Monitoring: {}", watch_root.display());
    println!("🔧 Press Ctrl+C to stop");
    println!("{}", "=".repeat(60));

    // Subscribed before the sweep: files arriving mid-sweep still get an
    // event, and events for files the sweep already moved are no-ops
    let watcher = DirectoryWatcher::new(&watch_root);
    let (events, handle) = watcher
        .subscribe()
        .with_context(|| format!("Failed to watch {}", watch_root.display()))?;

    let report = organizer
        .organize_existing_files_until(stopped(stop_rx.clone()))
        .await
        .with_context(|| format!("Failed to scan {}", watch_root.display()))?;

    if !report.interrupted {
        println!();
        println!("👀 Watching for new files...");
        println!();

        let handler = EventHandler::new(organizer).with_debounce(config.debounce);
        let stats = handler.run(events, stopped(stop_rx)).await;

        tracing::info!(
            "Handled {} events: {} moved, {} ignored, {} failed",
            stats.received,
            stats.moved,
            stats.ignored,
            stats.failed
        );
    }

    handle.stop();

    println!();
    println!();
    println!("⏹️  File organizer stopped");

    Ok(())
}

/// Wire the configured classifier into an organizer for `watch_root`
pub fn build_organizer(config: &ResolvedConfig, watch_root: PathBuf) -> Organizer {
    let table = config.category_table();
    for (ext, owners) in table.duplicate_extensions() {
        tracing::warn!(
            "Extension {} is claimed by {}; using {}",
            ext,
            owners.join(", "),
            owners[0]
        );
    }

    let classifier = Classifier::new(table, Some(config.completion_client()))
        .with_timeout(config.classify_timeout);

    Organizer::new(watch_root, classifier)
}

/// Resolves once `true` has been published on `stop`
pub async fn stopped(mut stop: watch::Receiver<bool>) {
    while !*stop.borrow_and_update() {
        if stop.changed().await.is_err() {
            // Sender gone without a stop request: never stop
            std::future::pending::<()>().await;
        }
    }
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        // Without a signal handler the loop only ends when the watcher does
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stopped_waits_for_stop_request() {
        let (tx, rx) = watch::channel(false);
        let waiter = tokio::spawn(stopped(rx.clone()));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();

        // Late subscribers see the stop immediately
        tokio::time::timeout(Duration::from_millis(100), stopped(rx))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_stopped_ignores_false_updates() {
        let (tx, rx) = watch::channel(false);
        tx.send(false).unwrap();

        let result = tokio::time::timeout(Duration::from_millis(50), stopped(rx)).await;
        assert!(result.is_err());
    }
}
