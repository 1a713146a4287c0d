//! Configuration for autosort.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (GEMINI_API_KEY, AUTOSORT_MODEL, AUTOSORT_ENDPOINT,
//!    AUTOSORT_DEBOUNCE_MS, AUTOSORT_CLASSIFY_TIMEOUT_SECS), after loading `.env`
//! 2. Config file (.autosort/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .autosort/config.yaml
//! - Falls back to <user config dir>/autosort/config.yaml
//!
//! Configuration is resolved once at startup and handed to the services that
//! need it; nothing here is global.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::adapters::{CompletionClient, GeminiClient, GeminiConfig};
use crate::core::DEFAULT_CLASSIFY_TIMEOUT;
use crate::domain::CategoryTable;
use crate::ingest::DEFAULT_DEBOUNCE;

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "AUTOSORT_MODEL";
pub const ENV_ENDPOINT: &str = "AUTOSORT_ENDPOINT";
pub const ENV_DEBOUNCE_MS: &str = "AUTOSORT_DEBOUNCE_MS";
pub const ENV_CLASSIFY_TIMEOUT_SECS: &str = "AUTOSORT_CLASSIFY_TIMEOUT_SECS";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub classifier: ClassifierFileConfig,
    #[serde(default)]
    pub watch: WatchFileConfig,
    /// Extra categories, appended after the built-in table
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifierFileConfig {
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchFileConfig {
    pub debounce_ms: Option<u64>,
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Gemini client settings (API key may be absent)
    pub gemini: GeminiConfig,
    /// Upper bound for one classification call
    pub classify_timeout: Duration,
    /// Settle delay after a creation event
    pub debounce: Duration,
    /// User-defined categories from the config file
    pub extra_categories: BTreeMap<String, Vec<String>>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            classify_timeout: DEFAULT_CLASSIFY_TIMEOUT,
            debounce: DEFAULT_DEBOUNCE,
            extra_categories: BTreeMap::new(),
            config_file: None,
        }
    }
}

impl ResolvedConfig {
    /// Load from `.env`, the process environment, and the discovered config file
    pub fn load() -> Result<Self> {
        if let Err(e) = dotenv::dotenv() {
            if e.not_found() {
                tracing::debug!("No .env file found");
            } else {
                tracing::warn!("Error loading .env file: {}", e);
            }
        }

        let config_file = find_config_file();
        Self::resolve(config_file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Resolve from an optional config file and an environment lookup
    pub fn resolve<F>(config_file: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match config_file {
            Some(path) => load_config_file(path)?,
            None => ConfigFile::default(),
        };

        let api_key = env(ENV_API_KEY).filter(|k| !k.trim().is_empty());

        let model = env(ENV_MODEL)
            .or(file.classifier.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let endpoint = env(ENV_ENDPOINT)
            .or(file.classifier.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let classify_timeout = match env(ENV_CLASSIFY_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(parse_number(ENV_CLASSIFY_TIMEOUT_SECS, &raw)?),
            None => file
                .classifier
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_CLASSIFY_TIMEOUT),
        };

        let debounce = match env(ENV_DEBOUNCE_MS) {
            Some(raw) => Duration::from_millis(parse_number(ENV_DEBOUNCE_MS, &raw)?),
            None => file
                .watch
                .debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_DEBOUNCE),
        };

        Ok(Self {
            gemini: GeminiConfig {
                api_key,
                model,
                endpoint,
            },
            classify_timeout,
            debounce,
            extra_categories: file.categories,
            config_file: config_file.map(Path::to_path_buf),
        })
    }

    /// Built-in table plus any categories from the config file
    pub fn category_table(&self) -> CategoryTable {
        let mut table = CategoryTable::builtin();
        table.extend_with(self.extra_categories.clone());
        table
    }

    /// The external classification client. Built even without an API key;
    /// calls then fail and resolve to the catch-all category.
    pub fn completion_client(&self) -> Arc<dyn CompletionClient> {
        Arc::new(GeminiClient::new(self.gemini.clone()))
    }

    pub fn has_api_key(&self) -> bool {
        self.gemini.api_key.is_some()
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .with_context(|| format!("{} must be a whole number, got {:?}", key, raw))
}

/// Find config file by searching current directory and parents, then the
/// user config directory
fn find_config_file() -> Option<PathBuf> {
    if let Ok(mut current) = std::env::current_dir() {
        loop {
            let config_path = current.join(".autosort").join("config.yaml");
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("autosort").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn write_config(temp: &TempDir, yaml: &str) -> PathBuf {
        let dir = temp.path().join(".autosort");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", yaml).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = ResolvedConfig::resolve(None, env_from(&[])).unwrap();

        assert!(!config.has_api_key());
        assert_eq!(config.gemini.model, DEFAULT_MODEL);
        assert_eq!(config.gemini.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.debounce, Duration::from_secs(1));
        assert_eq!(config.classify_timeout, DEFAULT_CLASSIFY_TIMEOUT);
        assert!(config.config_file.is_none());
        assert_eq!(config.category_table(), CategoryTable::builtin());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
version: "1.0"
classifier:
  model: gemini-pro
  timeout_seconds: 5
watch:
  debounce_ms: 250
categories:
  Ebooks: [".epub", "mobi"]
"#,
        );

        let config = ResolvedConfig::resolve(Some(&path), env_from(&[])).unwrap();

        assert_eq!(config.gemini.model, "gemini-pro");
        assert_eq!(config.gemini.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.classify_timeout, Duration::from_secs(5));
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.config_file, Some(path));
        assert_eq!(
            config.category_table().category_for_extension(".mobi"),
            Some("Ebooks")
        );
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
classifier:
  model: gemini-pro
watch:
  debounce_ms: 250
"#,
        );

        let env = env_from(&[
            (ENV_API_KEY, "secret"),
            (ENV_MODEL, "gemini-1.5-flash"),
            (ENV_DEBOUNCE_MS, "0"),
        ]);
        let config = ResolvedConfig::resolve(Some(&path), env).unwrap();

        assert!(config.has_api_key());
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.debounce, Duration::ZERO);
    }

    #[test]
    fn test_blank_api_key_is_absent() {
        let config = ResolvedConfig::resolve(None, env_from(&[(ENV_API_KEY, "  ")])).unwrap();
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_bad_number_in_env() {
        let result = ResolvedConfig::resolve(None, env_from(&[(ENV_DEBOUNCE_MS, "soon")]));
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains(ENV_DEBOUNCE_MS));
    }

    #[test]
    fn test_malformed_config_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "watch: [not, a, map]");

        assert!(ResolvedConfig::resolve(Some(&path), env_from(&[])).is_err());
    }
}
