//! Adapter interfaces for external systems.
//!
//! The only external system is the text-completion service used to classify
//! files whose extension is not in the category table.

pub mod gemini;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

// Re-export the Gemini adapter
pub use gemini::{GeminiClient, GeminiConfig};

/// Errors from the external classification service.
///
/// Callers treat every variant the same way; the split only exists for logs.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("response contained no text")]
    EmptyResponse,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Trait for text-completion backends: prompt in, raw text out
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Human-readable client name
    fn name(&self) -> &str;

    /// Send a prompt and return the raw response text
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ClassifierError>;
}
