//! autosort - Sort new files into category folders as they appear
//!
//! Watches a single folder and moves every new file into a subfolder named
//! after its category. Categories come from a static extension table; files
//! with unknown extensions are classified by Gemini, falling back to `Other`.
//!
//! # Architecture
//!
//! ```text
//! notify → DirectoryWatcher → EventHandler → Organizer → Classifier
//!                                                          ↓ (unknown ext)
//!                                                    CompletionClient
//! ```
//!
//! # Modules
//!
//! - `adapters`: External classification service (Gemini)
//! - `core`: Classifier and Organizer
//! - `domain`: Category table and file events
//! - `ingest`: Directory watcher and event handler
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Organize ~/Downloads and keep watching it
//! GEMINI_API_KEY=... autosort ~/Downloads
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod ingest;

// Re-export main types at crate root for convenience
pub use crate::adapters::{ClassifierError, CompletionClient, GeminiClient, GeminiConfig};
pub use crate::config::ResolvedConfig;
pub use crate::core::{Classifier, OrganizeError, OrganizeOutcome, Organizer, SkipReason, SweepReport};
pub use crate::domain::{CategoryTable, FileEvent, FileEventKind, CATCH_ALL};
pub use crate::ingest::{DirectoryWatcher, EventHandler, Handled, HandlerStats};
