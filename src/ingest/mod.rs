//! File event ingestion.
//!
//! The pipeline:
//!
//! 1. **Watcher**: Subscribes to the watch root (non-recursive) via notify
//! 2. **Handler**: Waits for each new file to settle, then hands it to the
//!    organizer, one event at a time
//!
//! # Architecture
//!
//! ```text
//! watch root → DirectoryWatcher → mpsc → EventHandler → Organizer
//!                                                         ↓
//!                                              <watch root>/<Category>/
//! ```

pub mod handler;
pub mod watcher;

// Re-export key types
pub use handler::{EventHandler, Handled, HandlerStats, DEFAULT_DEBOUNCE};
pub use watcher::{DirectoryWatcher, WatchHandle, WatcherError};
