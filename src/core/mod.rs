//! Core organizing logic.
//!
//! This module contains:
//! - Classifier: Extension table lookup with an external fallback
//! - Organizer: Folder creation, collision handling, and moves

pub mod classifier;
pub mod organizer;

// Re-export commonly used types
pub use classifier::{build_prompt, Classifier, DEFAULT_CLASSIFY_TIMEOUT};
pub use organizer::{
    is_hidden, resolve_destination, OrganizeError, OrganizeOutcome, Organizer, SkipReason,
    SweepReport,
};
