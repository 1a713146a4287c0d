//! Domain types for autosort.
//!
//! This module contains the core data structures:
//! - Category: The category table and valid category vocabulary
//! - Events: File notifications from the watch source

pub mod category;
pub mod events;

// Re-export commonly used types
pub use category::{extension_of, CategoryEntry, CategoryTable, AUXILIARY_CATEGORIES, CATCH_ALL};
pub use events::{FileEvent, FileEventKind};
