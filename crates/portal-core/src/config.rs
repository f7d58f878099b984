//! Configuration for portal-core
//!
//! Centralized configuration for search tuning, paging, input debouncing and
//! where records are stored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use portal_search::{SearchConfig, SearchConfigError};

/// Directory name under the platform data dir.
pub const APP_DIR_NAME: &str = "portal";

/// Portal-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Smart search and fuzzy matching
    pub search: SearchConfig,
    /// Table paging
    pub paging: PagingConfig,
    /// Search input debouncing
    pub debounce: DebounceConfig,
    /// Record storage location and scope
    pub storage: StorageConfig,
}

/// Table paging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Rows per page
    pub page_size: usize,
    /// Page number buttons shown at once
    pub max_visible_pages: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_visible_pages: 5,
        }
    }
}

/// Search input debouncing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Quiet period after the last keystroke before the filter runs
    pub quiet_period_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            quiet_period_ms: 300,
        }
    }
}

impl DebounceConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

/// Record storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one JSON file per storage key
    pub data_dir: Option<PathBuf>,
    /// User scope of the storage keys (`<entity>_<user_id>`)
    pub user_id: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            user_id: "user1".to_string(),
        }
    }
}

impl StorageConfig {
    /// Configured data directory, or `<platform data dir>/portal`.
    pub fn resolved_data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME)))
    }
}

impl PortalConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load and validate a configuration file.
    ///
    /// A missing file yields the defaults. `.json` files are read as JSON,
    /// everything else as TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            Self::from_toml(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
        };

        config.validate()?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()?;

        if self.paging.page_size == 0 {
            return Err(ConfigError::OutOfRange(
                "page_size must be positive".to_string(),
            ));
        }

        if self.paging.max_visible_pages == 0 {
            return Err(ConfigError::OutOfRange(
                "max_visible_pages must be positive".to_string(),
            ));
        }

        if self.storage.user_id.trim().is_empty() {
            return Err(ConfigError::MissingField("storage.user_id".to_string()));
        }

        Ok(())
    }
}

/// Configuration validation error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid search tuning
    #[error("Invalid search settings: {0}")]
    Search(#[from] SearchConfigError),

    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Required field is missing
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Config file could not be read
    #[error("Cannot read config: {0}")]
    Read(String),

    /// Config file could not be parsed
    #[error("Cannot parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PortalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.paging.page_size, 10);
        assert_eq!(config.paging.max_visible_pages, 5);
        assert_eq!(config.debounce.quiet_period(), Duration::from_millis(300));
        assert_eq!(config.storage.user_id, "user1");
    }

    #[test]
    fn test_json_serialization() {
        let config = PortalConfig::default();
        let json = config.to_json().unwrap();
        let parsed = PortalConfig::from_json(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml() {
        let config = PortalConfig::from_toml(
            r#"
            [paging]
            page_size = 25

            [search]
            fuzzy_threshold = 0.8
            "#,
        )
        .unwrap();

        assert_eq!(config.paging.page_size, 25);
        assert_eq!(config.paging.max_visible_pages, 5);
        assert_eq!(config.search.fuzzy_threshold, 0.8);
        assert_eq!(config.debounce.quiet_period_ms, 300);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = PortalConfig::default();
        config.storage.data_dir = Some(PathBuf::from("/tmp/portal"));
        let toml = config.to_toml().unwrap();
        assert_eq!(PortalConfig::from_toml(&toml).unwrap(), config);
    }

    #[test]
    fn test_out_of_range() {
        let mut config = PortalConfig::default();
        config.paging.page_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));

        let mut config = PortalConfig::default();
        config.search.fuzzy_threshold = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Search(_))));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = PortalConfig::load(Path::new("/nonexistent/portal.toml")).unwrap();
        assert_eq!(config, PortalConfig::default());
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let storage = StorageConfig {
            data_dir: Some(PathBuf::from("/srv/portal")),
            ..StorageConfig::default()
        };
        assert_eq!(storage.resolved_data_dir(), Some(PathBuf::from("/srv/portal")));
    }
}
