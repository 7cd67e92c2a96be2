//! Configuration management for Margin.
//!
//! This module provides configuration loading, saving, and defaults.
//! Configuration is stored in TOML format in a platform-appropriate location.

use crate::error::{MarginError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure for Margin.
///
/// ## Example Configuration File (margin.toml)
///
/// ```toml
/// [general]
/// snapshot_path = "/home/me/notes/.margin"
/// log_level = "info"
///
/// [search]
/// max_results = 10
/// reference_fallback_limit = 10
/// snippet_marker = "mermaid"
/// max_occurrences_per_document = 50
///
/// [corpus]
/// snippets_path = "/home/me/notes/snippets.json"
/// references_path = "/home/me/notes/references.json"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Query routing and result limits
    pub search: SearchConfig,

    /// Static corpus sources
    pub corpus: CorpusConfig,
}

/// General configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Snapshot directory (None = default data directory)
    pub snapshot_path: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            snapshot_path: None,
            log_level: "info".to_string(),
        }
    }
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of merged results per query
    pub max_results: usize,

    /// Maximum number of full-text reference hits when no key matches exactly
    pub reference_fallback_limit: usize,

    /// Marker that routes `<marker>:<prefix>` queries to the snippet corpus
    pub snippet_marker: String,

    /// Cap on matches reported per document (None = every occurrence)
    pub max_occurrences_per_document: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_results: 10,
            reference_fallback_limit: 10,
            snippet_marker: "mermaid".to_string(),
            max_occurrences_per_document: None,
        }
    }
}

/// Corpus source configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CorpusConfig {
    /// JSON snippet file (None = built-in diagram templates)
    pub snippets_path: Option<PathBuf>,

    /// JSON reference file (None = no references)
    pub references_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default config if no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        info!(path = %path.display(), "Loading configuration");
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(|e| MarginError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
        })?;

        Ok(config)
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "margin").ok_or_else(|| MarginError::ConfigError {
            reason: "Could not determine config directory".to_string(),
        })?;

        Ok(dirs.config_dir().join("margin.toml"))
    }

    /// Get the default data directory path.
    pub fn default_data_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "margin").ok_or_else(|| MarginError::ConfigError {
            reason: "Could not determine data directory".to_string(),
        })?;

        Ok(dirs.data_dir().to_path_buf())
    }

    /// Get the snapshot directory (from config or default).
    pub fn snapshot_dir(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.general.snapshot_path {
            Ok(path.clone())
        } else {
            Self::default_data_dir()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.max_results, 10);
        assert_eq!(config.search.reference_fallback_limit, 10);
        assert_eq!(config.search.snippet_marker, "mermaid");
        assert!(config.search.max_occurrences_per_document.is_none());
    }

    #[test]
    fn test_load_full_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        fs::write(
            &config_path,
            r#"
[general]
log_level = "debug"

[search]
snippet_marker = "snip"
max_occurrences_per_document = 3

[corpus]
references_path = "refs.json"
"#,
        )
        .unwrap();

        let loaded = Config::load_from(&config_path).unwrap();
        assert_eq!(loaded.general.log_level, "debug");

        assert_eq!(loaded.search.snippet_marker, "snip");
        assert_eq!(loaded.search.max_occurrences_per_document, Some(3));
        assert_eq!(loaded.corpus.references_path, Some(PathBuf::from("refs.json")));
    }

    #[test]
    fn test_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.search.max_results, 10); // Default value
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        fs::write(&config_path, "[search]\nmax_results = 5\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.snippet_marker, "mermaid");
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "[search\nmax_results = ").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(matches!(err, MarginError::ConfigError { .. }));
    }

    #[test]
    fn test_snapshot_dir_override() {
        let mut config = Config::default();
        config.general.snapshot_path = Some(PathBuf::from("/tmp/margin-data"));
        assert_eq!(config.snapshot_dir().unwrap(), PathBuf::from("/tmp/margin-data"));
    }
}
