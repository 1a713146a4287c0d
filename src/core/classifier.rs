//! File classification.
//!
//! Known extensions are resolved from the category table without touching
//! the network. Only unknown extensions are sent to the completion client,
//! and anything other than a valid category name in reply becomes "Other".

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::CompletionClient;
use crate::domain::{extension_of, CategoryTable, CATCH_ALL};

pub const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// Maps files to category names
pub struct Classifier {
    table: CategoryTable,
    client: Option<Arc<dyn CompletionClient>>,
    timeout: Duration,
}

impl Classifier {
    /// Create a classifier. Without a client, unknown extensions go straight
    /// to the catch-all category.
    pub fn new(table: CategoryTable, client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self {
            table,
            client,
            timeout: DEFAULT_CLASSIFY_TIMEOUT,
        }
    }

    /// Bound every external call by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Static lookup only
    pub fn category_for_extension(&self, ext: &str) -> Option<String> {
        self.table.category_for_extension(ext).map(str::to_string)
    }

    /// Ask the completion client. Never fails: errors and answers outside the
    /// valid vocabulary both resolve to "Other".
    pub async fn category_via_external_classifier(&self, file_name: &str, ext: &str) -> String {
        let Some(client) = &self.client else {
            tracing::debug!("No classifier configured for {}, using {}", file_name, CATCH_ALL);
            return CATCH_ALL.to_string();
        };

        let prompt = build_prompt(file_name, ext, &self.table.valid_categories());

        match client.complete(&prompt, self.timeout).await {
            Ok(response) => {
                let category = response.trim();
                if self.table.is_valid(category) {
                    tracing::debug!("{} classified {} as {}", client.name(), file_name, category);
                    category.to_string()
                } else {
                    tracing::warn!(
                        "{} returned unknown category {:?} for {}, using {}",
                        client.name(),
                        category,
                        file_name,
                        CATCH_ALL
                    );
                    CATCH_ALL.to_string()
                }
            }
            Err(e) => {
                tracing::warn!("AI categorization error for {}: {}", file_name, e);
                CATCH_ALL.to_string()
            }
        }
    }

    /// Classify a file: extension table first, external service on a miss
    pub async fn classify(&self, path: &Path) -> String {
        let ext = extension_of(path);

        if let Some(category) = self.category_for_extension(&ext) {
            return category;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.category_via_external_classifier(&file_name, &ext).await
    }
}

/// Prompt asking for exactly one category name from `vocabulary`
pub fn build_prompt(file_name: &str, ext: &str, vocabulary: &[String]) -> String {
    format!(
        "Analyze this file and suggest the best category for organization:\n\
         \n\
         Filename: {file_name}\n\
         Extension: {ext}\n\
         \n\
         Available categories: {categories}\n\
         \n\
         Consider:\n\
         1. File extension and type\n\
         2. Filename patterns (e.g., 'backup_', 'temp_', 'config_')\n\
         3. Common use cases\n\
         \n\
         Respond with ONLY the category name, nothing else.",
        categories = vocabulary.join(", "),
    )
}
