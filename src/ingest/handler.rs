//! Event adapter between the watch source and the organizer.
//!
//! Turns file events into `Organizer::handle_file` calls: creations of
//! regular files are organized after a short settle delay, everything else is
//! ignored. Events are handled strictly one at a time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::core::{OrganizeOutcome, Organizer};
use crate::domain::{FileEvent, FileEventKind};

/// Default wait between a creation notification and organizing the file
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Counts for a finished watch loop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerStats {
    pub received: usize,
    pub ignored: usize,
    pub moved: usize,
    pub failed: usize,
}

/// What became of a single event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    /// Modification, directory, or other event we do not act on
    Ignored,
    Organized(OrganizeOutcome),
    Failed,
}

/// Dispatches file events to the organizer
pub struct EventHandler {
    organizer: Arc<Organizer>,
    debounce: Duration,
}

impl EventHandler {
    pub fn new(organizer: Arc<Organizer>) -> Self {
        Self {
            organizer,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Override the settle delay
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Handle a single event
    pub async fn handle(&self, event: FileEvent) -> Handled {
        match event.kind {
            FileEventKind::Modified => {
                tracing::trace!("Ignoring modification of {}", event.path.display());
                Handled::Ignored
            }
            FileEventKind::Created if event.is_dir => {
                tracing::debug!("Ignoring new directory {}", event.path.display());
                Handled::Ignored
            }
            FileEventKind::Created => {
                // Give the producer a moment to finish writing
                tokio::time::sleep(self.debounce).await;
                match self.organizer.handle_file(&event.path).await {
                    Some(outcome) => Handled::Organized(outcome),
                    None => Handled::Failed,
                }
            }
        }
    }

    /// Process events until the channel closes or `shutdown` resolves.
    ///
    /// Shutdown is only checked between events, so a file that is being
    /// handled always finishes first.
    pub async fn run<S>(&self, mut events: mpsc::Receiver<FileEvent>, shutdown: S) -> HandlerStats
    where
        S: Future<Output = ()>,
    {
        let mut stats = HandlerStats::default();
        tokio::pin!(shutdown);

        loop {
            let event = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, leaving watch loop");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => event,
                    None => {
                        tracing::info!("Event source closed");
                        break;
                    }
                },
            };

            stats.received += 1;
            match self.handle(event).await {
                Handled::Organized(outcome) if outcome.is_moved() => stats.moved += 1,
                Handled::Organized(_) | Handled::Ignored => stats.ignored += 1,
                Handled::Failed => stats.failed += 1,
            }
        }

        stats
    }
}
